// Survey submission, scoring and alternate-title lookup.
// All scoring goes through the `JobScorer` trait held in `AppState`.

pub mod handlers;
pub mod scorer;
