/// Readers for data supplied by external collaborators.
///
/// Submodules:
/// - `forecast`: daily surf forecast documents.

pub mod forecast;
