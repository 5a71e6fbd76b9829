/// Name under which the request schema for `POST /documents` is registered.
pub const POST_DOCUMENT_SCHEMA: &str = "postDocument";

/// Collection used by the document store when none is configured.
pub const DEFAULT_COLLECTION: &str = "documents";

/// Length of a document id as issued by the document store.
pub const DOCUMENT_ID_LEN: usize = 24;
