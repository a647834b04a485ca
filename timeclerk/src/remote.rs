//! Selector tokens for the hosted timecard application's markup.
//!
//! Everything the core knows about the remote page structure is centralized
//! here: element ids, the timesheet table classes, and the shape of the
//! navigation links. The rest of the crate treats these as opaque tokens.

use crate::reconcile::{render_hours_integer, render_hours_two_decimal};
use crate::selector::Selector;
use crate::types::{Category, DateKey};

/// The account (email) field on the login page.
pub fn account_field() -> Selector {
    Selector::Id("EmailAddress".into())
}

/// The passphrase field presented after the account step.
pub fn passphrase_field() -> Selector {
    Selector::Css("input[name='Password']".into())
}

/// The submit control of whichever login form is currently shown.
pub fn login_submit() -> Selector {
    Selector::Css("form input[type='submit'], form button[type='submit']".into())
}

/// The "Yes" button of the transient re-login confirmation prompt.
pub fn relogin_confirm() -> Selector {
    Selector::XPath("//button[contains(normalize-space(text()), 'Yes')]".into())
}

/// The landing-page link into the open timesheet's edit view.
pub fn edit_timesheet_link() -> Selector {
    Selector::PartialLinkText("Edit an Open Timesheet".into())
}

/// All charge rows of the timesheet grid. Separator/header rows are styled
/// with an inline background color and are excluded by the query itself.
pub fn category_rows() -> Selector {
    Selector::XPath(
        "//tr[@class='time_timecardtable'][not(contains(@style, 'background-color'))]".into(),
    )
}

/// The label cell within a charge row.
pub fn row_label() -> Selector {
    Selector::Css("td.time_timecardtableItem".into())
}

/// The charge row carrying the given category label.
pub fn category_row(category: &Category) -> Selector {
    Selector::XPath(format!(
        "//tr[@class='time_timecardtable'][td[@class='time_timecardtableItem']/a[normalize-space(text())='{}']]",
        category.as_str()
    ))
}

/// The cell link for one date within a charge row. The href carries the
/// date in the remote's `M/D/YYYY` form.
pub fn cell_link(date: DateKey) -> Selector {
    Selector::XPath(format!(
        ".//a[contains(@href, 'entrydate={}')]",
        date.nav_format()
    ))
}

/// The entry-list link matching an existing value exactly, in either of the
/// renderings the remote uses (integer or two decimals).
pub fn entry_link(old_hours: f64) -> Selector {
    Selector::XPath(format!(
        "//a[normalize-space(text())='{}' or normalize-space(text())='{}']",
        render_hours_integer(old_hours),
        render_hours_two_decimal(old_hours)
    ))
}

/// Fallback entry-list match on the integer portion only. The remote's
/// number formatting is inconsistent; see the mutator for the caveats.
pub fn entry_link_fallback(old_hours: f64) -> Selector {
    Selector::PartialLinkText(render_hours_integer(old_hours))
}

/// The hour input on the entry form.
pub fn hours_field() -> Selector {
    Selector::Id("txthrs".into())
}

/// The save control on the entry form.
pub fn save_button() -> Selector {
    Selector::Id("btnsave".into())
}

/// The justification field of the optional reason step.
pub fn reason_field() -> Selector {
    Selector::Id("txtreason".into())
}

/// Whichever confirm control the reason step happens to carry.
pub fn reason_confirm() -> Selector {
    Selector::XPath("//*[@id='btnreasonok' or @id='btnsubmit' or @id='btnsave']".into())
}
