//! Terminal views and the callbacks behind them.
//!
//! All editor state lives in the [`AppData`] stored as Cursive user data.
//! Views only mirror it; every callback writes through to `AppData` first
//! and then refreshes what is on screen.

/// Per-module form views.
pub mod form;
/// Search box, category picker and module list.
pub mod sidebar;

use cursive::{
    Cursive,
    traits::*,
    views::{Dialog, LinearLayout, ScrollView, TextView},
};

use crate::{data::AppData, preview::PreviewRunner};

/// Name of the status line view.
pub const STATUS_VIEW: &str = "status";

const HELP: &str = "^S save  ^P preview  ^R reload  ^Q quit";

/// Run `f` against the editor state.
pub fn with_app<R>(s: &mut Cursive, f: impl FnOnce(&mut AppData) -> R) -> Option<R> {
    s.with_user_data(f)
}

/// The whole editor screen.
pub fn main_view(app: &AppData) -> impl View {
    let body = LinearLayout::horizontal()
        .child(
            cursive::views::Panel::new(sidebar::sidebar_view(app))
                .title("Modules")
                .fixed_width(32),
        )
        .child(
            cursive::views::Panel::new(ScrollView::new(
                LinearLayout::vertical().with_name(form::HOST_VIEW),
            ))
            .title("Settings")
            .full_width(),
        );

    LinearLayout::vertical()
        .child(body.full_height())
        .child(TextView::new(status_line(app)).with_name(STATUS_VIEW))
        .child(TextView::new(HELP))
}

fn status_line(app: &AppData) -> String {
    let modified = if app.needs_save || app.has_pending_edits() {
        "[modified] "
    } else {
        ""
    };
    let notice = app.status().map(ToString::to_string).unwrap_or_default();
    format!("{modified}{} | {notice}", app.config_path().display())
}

/// Redraw the status line from the editor state.
pub fn refresh_status(s: &mut Cursive) {
    let Some(line) = with_app(s, |app| status_line(app)) else {
        return;
    };
    s.call_on_name(STATUS_VIEW, |v: &mut TextView| v.set_content(line));
}

/// Refresh everything a commit may have changed.
fn after_commit(s: &mut Cursive) {
    form::refresh_raw_text(s);
    sidebar::refresh_modules(s);
    refresh_status(s);
}

fn save(s: &mut Cursive) -> bool {
    let Some(result) = with_app(s, AppData::save) else {
        return false;
    };
    after_commit(s);
    form::show_current(s);
    match result {
        Ok(()) => true,
        Err(e) => {
            s.add_layer(Dialog::info(format!("Save failed:\n{e}")).title("Error"));
            false
        }
    }
}

/// Commit and write the document.
pub fn handle_save(s: &mut Cursive) {
    save(s);
}

/// Re-read the document from disk.
pub fn handle_reload(s: &mut Cursive) {
    let Some(result) = with_app(s, AppData::reload) else {
        return;
    };
    if let Err(e) = result {
        s.add_layer(Dialog::info(format!("Reload failed:\n{e}")).title("Error"));
    }
    after_commit(s);
    form::show_current(s);
}

/// Commit, render the prompt and show the program output as is.
pub fn handle_preview(s: &mut Cursive, runner: &dyn PreviewRunner) {
    let Some(result) = with_app(s, |app| app.preview(runner)) else {
        return;
    };
    after_commit(s);
    form::show_current(s);
    let dialog = match result {
        Ok(out) => Dialog::around(TextView::new(out)).title("Preview"),
        Err(e) => Dialog::around(TextView::new(e.to_string())).title("Preview failed"),
    };
    s.add_layer(dialog.dismiss_button("Close"));
}

/// Quit, asking first when there is something unsaved.
pub fn handle_quit(s: &mut Cursive) {
    let unsaved =
        with_app(s, |app| app.needs_save || app.has_pending_edits()).unwrap_or(false);
    if !unsaved {
        s.quit();
        return;
    }
    s.add_layer(
        Dialog::text("There are unsaved changes.")
            .title("Quit")
            .button("Save & quit", |s| {
                s.pop_layer();
                if save(s) {
                    s.quit();
                }
            })
            .button("Discard", Cursive::quit)
            .dismiss_button("Cancel"),
    );
}

/// Runs on the UI thread once the schema fetch has finished.
pub fn on_schema_delivered(s: &mut Cursive) {
    if with_app(s, AppData::poll_schema).unwrap_or(false) {
        refresh_status(s);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use cursive::views::{EditView, SelectView};

    use super::*;
    use crate::{data::document::Document, error::ProcessError, ui::sidebar::MODULE_LIST};

    const SAMPLE: &str = "[git_branch]\nformat = \"Y\"\n";

    fn editor(text: &str) -> Cursive {
        let app = AppData::with_document("starship.toml", Document::parse(text).unwrap());
        let mut siv = Cursive::new();
        siv.add_layer(main_view(&app));
        siv.set_user_data(app);
        siv
    }

    fn select(s: &mut Cursive, label: &str) {
        s.call_on_name(MODULE_LIST, |list: &mut SelectView<String>| {
            let idx = list.iter().position(|(l, _)| l == label).unwrap();
            let _ = list.set_selection(idx);
        });
        form::show_panel(s, label);
    }

    fn field_text(s: &mut Cursive, name: &str) -> String {
        s.call_on_name(&format!("field:{name}"), |e: &mut EditView| {
            e.get_content().to_string()
        })
        .unwrap()
    }

    #[test]
    fn test_refresh_keeps_selection() {
        let mut siv = editor(SAMPLE);
        select(&mut siv, "git_branch");

        with_app(&mut siv, |app| app.query = "git".to_string());
        sidebar::refresh_modules(&mut siv);
        assert_eq!(sidebar::selected_label(&mut siv).as_deref(), Some("git_branch"));

        with_app(&mut siv, |app| app.query = "dir".to_string());
        sidebar::refresh_modules(&mut siv);
        assert_ne!(sidebar::selected_label(&mut siv).as_deref(), Some("git_branch"));
    }

    #[test]
    fn test_preview_redraws_fields_after_raw_edit() {
        let mut siv = editor(SAMPLE);
        select(&mut siv, "git_branch");
        assert_eq!(field_text(&mut siv, "format"), "Y");

        with_app(&mut siv, |app| app.edit_raw("[git_branch]\nformat = \"X\"\n"));
        let runner = |_: &Path| -> Result<String, ProcessError> { Ok("prompt".to_string()) };
        handle_preview(&mut siv, &runner);

        assert_eq!(field_text(&mut siv, "format"), "X");
        assert_eq!(sidebar::selected_label(&mut siv).as_deref(), Some("git_branch"));
    }
}
