//! Profiles of known deployments.

use once_cell::sync::Lazy;
use reqwest::Url;

use crate::extract::{extract_row_with_submits, format_submits};
use crate::Profile;

// parsing static url will never fail
static STASZIC_URL: Lazy<Url> = Lazy::new(|| Url::parse("https://sio2.staszic.waw.pl").unwrap());

/// SIO2 at Staszic, whose problem table shows the submits used next to the limit.
pub fn staszic() -> Profile {
    Profile::sio2(STASZIC_URL.clone())
        .with_submit_labels(&["Wyślij", "Submit"])
        .with_rows(4, extract_row_with_submits)
        .with_extras_formatter(format_submits)
}
