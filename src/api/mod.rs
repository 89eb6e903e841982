//! API layer for HTTP request handling.
//!
//! The HTTP surface is small: file uploads under `/api/filehandler/` and static
//! file serving for every other path. Route handlers live in [`handlers`]; the
//! router itself is assembled by [`crate::build_router`].

pub mod handlers;
