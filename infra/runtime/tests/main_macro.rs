#[test]
fn main_attribute_expands() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/server_main.rs");
    t.pass("tests/ui/default_main.rs");
    t.pass("tests/ui/tuned_main.rs");
}
