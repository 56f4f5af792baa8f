use std::{future::Future, path::PathBuf, pin::Pin, sync::Arc};

use anyhow::anyhow;
pub use cursive;
use cursive::{Cursive, CursiveExt, event::Event};

use crate::{
    data::{AppData, app_data::GLOBAL_LABEL, schema::Schema},
    error::FetchError,
    preview::PreviewRunner,
    ui::{self, form},
};

/// Pending schema download handed to the editor.
pub type SchemaFetch = Pin<Box<dyn Future<Output = Result<Schema, FetchError>> + Send>>;

/// Preview runner shared with UI callbacks.
pub type SharedRunner = Arc<dyn PreviewRunner + Send + Sync>;

/// What the editor needs to start.
pub struct EditorOptions {
    /// Document to edit and save to.
    pub config: PathBuf,
    /// Copy the existing file aside before each save.
    pub backup: bool,
    /// Schema download; `None` keeps the fallback field set.
    pub schema: Option<SchemaFetch>,
    /// Renders the prompt for previews.
    pub runner: SharedRunner,
}

/// Open the interactive editor and block until the user quits.
///
/// The schema download runs on the tokio runtime while the editor is in
/// use; the editor keeps working with the fallback fields if it fails.
/// Returns the final editor state.
///
/// # Errors
///
/// Only if the editor state cannot be recovered from the UI.
pub async fn run(options: EditorOptions) -> anyhow::Result<AppData> {
    let mut app_data = AppData::open(&options.config);
    app_data.backup = options.backup;

    #[cfg(feature = "logging")]
    {
        cursive::logger::init();
        cursive::logger::set_filter_levels_from_env();
    }
    let mut siv = Cursive::default();

    if let Some(fetch) = options.schema {
        let sink = siv.cb_sink().clone();
        app_data.request_schema(fetch, move || {
            if sink.send(Box::new(ui::on_schema_delivered)).is_err() {
                debug!("editor closed before the schema arrived");
            }
        });
    }

    let view = ui::main_view(&app_data);
    siv.set_user_data(app_data);

    let runner = options.runner;
    siv.add_global_callback(Event::CtrlChar('s'), ui::handle_save);
    siv.add_global_callback(Event::CtrlChar('r'), ui::handle_reload);
    siv.add_global_callback(Event::CtrlChar('q'), ui::handle_quit);
    siv.add_global_callback(Event::CtrlChar('p'), move |s| {
        ui::handle_preview(s, runner.as_ref())
    });
    #[cfg(feature = "logging")]
    siv.add_global_callback('~', cursive::Cursive::toggle_debug_console);

    siv.add_fullscreen_layer(view);
    form::show_panel(&mut siv, GLOBAL_LABEL);
    ui::refresh_status(&mut siv);

    siv.run();

    siv.take_user_data::<AppData>()
        .ok_or_else(|| anyhow!("editor state missing after exit"))
}
