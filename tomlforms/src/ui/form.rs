use std::sync::Arc;

use cursive::{
    Cursive,
    event::{EventResult, EventTrigger},
    theme::{Effect, Style},
    traits::*,
    view::IntoBoxedView,
    views::{Checkbox, DummyView, EditView, LinearLayout, ListView, OnEventView, TextArea, TextView},
};

use crate::{
    data::app_data::{GLOBAL_LABEL, Status},
    ui::{refresh_status, sidebar, with_app},
    widgets::{Control, Panel, PanelKey, registry::DISABLED_FIELD},
};

/// Container the selected panel is drawn into.
pub const HOST_VIEW: &str = "panel_host";
/// The full-text editor on the global panel.
pub const RAW_VIEW: &str = "raw_text";

const ENABLE_VIEW: &str = "enable";

fn field_view(name: &str) -> String {
    format!("field:{name}")
}

/// Panel addressed by a module list entry.
pub fn panel_key(label: &str) -> PanelKey {
    if label == GLOBAL_LABEL {
        PanelKey::Global
    } else {
        PanelKey::module(label)
    }
}

/// Build (on first use) and draw the panel for a module list entry.
pub fn show_panel(s: &mut Cursive, label: &str) {
    let key = panel_key(label);
    let Some((panel, raw)) = with_app(s, |app| {
        let panel = app.select(&key).clone();
        let raw = matches!(key, PanelKey::Global).then(|| app.raw_text().to_string());
        (panel, raw)
    }) else {
        return;
    };

    let title = label.to_string();
    s.call_on_name(HOST_VIEW, move |host: &mut LinearLayout| {
        host.clear();
        host.add_child(TextView::new(title).style(Style::from(Effect::Bold)));
        host.add_child(DummyView);
        host.add_child(form_view(&panel));
        if let Some(raw) = raw {
            host.add_child(DummyView);
            host.add_child(TextView::new(
                "Full text (applied on save; wins when edited after the fields):",
            ));
            host.add_child(raw_editor(raw).with_name(RAW_VIEW).min_height(8));
        }
    });
}

/// Redraw the panel of the selected list entry from the editor state.
pub fn show_current(s: &mut Cursive) {
    if let Some(label) = sidebar::selected_label(s) {
        show_panel(s, &label);
    }
}

/// Put the document text back into the full-text editor, if shown.
pub fn refresh_raw_text(s: &mut Cursive) {
    let Some(raw) = with_app(s, |app| app.raw_text().to_string()) else {
        return;
    };
    s.call_on_name(RAW_VIEW, |v: &mut OnEventView<TextArea>| {
        v.get_inner_mut().set_content(raw)
    });
}

/// A text area that reports every content change to `on_change`.
fn tracked_text_area<F>(content: String, on_change: F) -> OnEventView<TextArea>
where
    F: Fn(&mut Cursive, &str) + Send + Sync + 'static,
{
    let on_change = Arc::new(on_change);
    OnEventView::new(TextArea::new().content(content)).on_pre_event_inner(
        EventTrigger::any(),
        move |area, event| {
            let before = area.get_content().to_string();
            let result = area.on_event(event.clone());
            if area.get_content() == before {
                return Some(result);
            }
            let after = area.get_content().to_string();
            let on_change = Arc::clone(&on_change);
            Some(result.and(EventResult::with_cb(move |s| on_change(s, &after))))
        },
    )
}

fn raw_editor(raw: String) -> OnEventView<TextArea> {
    tracked_text_area(raw, |s, text| {
        with_app(s, |app| app.edit_raw(text));
        refresh_status(s);
    })
}

fn form_view(panel: &Panel) -> ListView {
    let mut list = ListView::new();

    if let Some(enable) = panel.enable() {
        let key = panel.key().clone();
        let checkbox = Checkbox::new()
            .with_checked(enable.value())
            .on_change(move |s, on| {
                with_app(s, |app| app.set_enabled(&key, on));
                s.call_on_name(&field_view(DISABLED_FIELD), |c: &mut Checkbox| {
                    let _ = c.set_checked(!on);
                });
                refresh_status(s);
            })
            .with_name(ENABLE_VIEW);
        list.add_child("enabled", checkbox);
        list.add_delimiter();
    }

    for (name, field) in panel.fields() {
        let def = field.def();
        let label = match (def.minimum, def.maximum) {
            (None, None) => name.to_string(),
            (min, max) => format!(
                "{name} [{}..{}]",
                min.map(|v| v.to_string()).unwrap_or_default(),
                max.map(|v| v.to_string()).unwrap_or_default()
            ),
        };
        let view = control_view(panel.key(), name, field.control());
        list.add_child(&label, view);
    }
    list
}

fn control_view(key: &PanelKey, name: &str, control: &Control) -> Box<dyn View> {
    let key = key.clone();
    let field = name.to_string();
    let view_name = field_view(name);
    match control {
        Control::Toggle(checked) => Checkbox::new()
            .with_checked(*checked)
            .on_change(move |s, checked| {
                with_app(s, |app| app.set_bool(&key, &field, checked));
                if field == DISABLED_FIELD {
                    s.call_on_name(ENABLE_VIEW, |c: &mut Checkbox| {
                        let _ = c.set_checked(!checked);
                    });
                }
                refresh_status(s);
            })
            .with_name(view_name)
            .into_boxed_view(),
        Control::Integer { value, .. } => {
            let submit_key = key.clone();
            let submit_field = field.clone();
            let submit_view = view_name.clone();
            EditView::new()
                .content(value.to_string())
                .on_edit(move |s, text, _cursor| {
                    if let Ok(v) = text.trim().parse::<i64>() {
                        with_app(s, |app| app.set_integer(&key, &field, v));
                        refresh_status(s);
                    }
                })
                .on_submit(move |s, text| {
                    let Ok(v) = text.trim().parse::<i64>() else {
                        with_app(s, |app| {
                            app.notify(Status::Warning(format!("{submit_field}: not a number")))
                        });
                        refresh_status(s);
                        return;
                    };
                    let stored = with_app(s, |app| app.set_integer(&submit_key, &submit_field, v))
                        .flatten();
                    if let Some(stored) = stored
                        && stored != v
                    {
                        s.call_on_name(&submit_view, |e: &mut EditView| {
                            let _ = e.set_content(stored.to_string());
                        });
                        with_app(s, |app| {
                            app.notify(Status::Info(format!("{submit_field} clamped to {stored}")))
                        });
                    }
                    refresh_status(s);
                })
                .with_name(view_name)
                .fixed_width(16)
                .into_boxed_view()
        }
        Control::Text(text) => EditView::new()
            .content(text.clone())
            .on_edit(move |s, text, _cursor| {
                with_app(s, |app| app.set_text(&key, &field, text));
                refresh_status(s);
            })
            .with_name(view_name)
            .into_boxed_view(),
        Control::Lines { text, .. } => tracked_text_area(text.clone(), move |s, text| {
            with_app(s, |app| app.set_text(&key, &field, text));
            refresh_status(s);
        })
        .with_name(view_name)
        .min_height(3)
        .into_boxed_view(),
    }
}
