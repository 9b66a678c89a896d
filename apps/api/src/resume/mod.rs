// Resume intake: file upload text extraction and the feedback endpoints.
// Extracted text is handed back to the client and never kept server-side.

pub mod document;
pub mod handlers;
