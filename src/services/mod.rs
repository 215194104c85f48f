//! Clients for the external collaborators: the Gemini analysis service, the
//! GitHub issue store (via the `gh` CLI), and plain reference-URL fetching.
//!
//! Failures from these clients are contained by their callers — an analysis or
//! publish failure never aborts processing of sibling records.

pub mod gemini;
pub mod github;
pub mod webfetch;
