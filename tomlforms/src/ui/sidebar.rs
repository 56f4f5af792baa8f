use cursive::{
    Cursive,
    traits::*,
    views::{DummyView, EditView, LinearLayout, SelectView, TextView},
};

use crate::{
    data::{AppData, app_data::GLOBAL_LABEL},
    filter::Category,
    ui::{form, with_app},
};

/// Name of the module list view.
pub const MODULE_LIST: &str = "modules";

fn fill(list: &mut SelectView<String>, modules: &[&str]) {
    list.clear();
    list.add_item_str(GLOBAL_LABEL);
    list.add_all_str(modules.iter().copied());
}

/// Search box, category picker and the filtered module list.
pub fn sidebar_view(app: &AppData) -> impl View {
    let query = EditView::new()
        .content(app.query.clone())
        .on_edit(|s, text, _cursor| {
            let text = text.to_string();
            with_app(s, |app| app.query = text);
            refresh_modules(s);
        });

    let mut category = SelectView::<Category>::new().popup();
    for c in Category::ALL {
        category.add_item(c.label(), c);
    }
    if let Some(idx) = Category::ALL.iter().position(|c| *c == app.category) {
        let _ = category.set_selection(idx);
    }
    let category = category.on_submit(|s, c: &Category| {
        let c = *c;
        with_app(s, |app| app.category = c);
        refresh_modules(s);
    });

    let mut modules = SelectView::<String>::new();
    fill(&mut modules, &app.modules());
    let modules = modules
        .on_select(|s, label: &String| form::show_panel(s, label))
        .with_name(MODULE_LIST)
        .scrollable();

    LinearLayout::vertical()
        .child(TextView::new("Search:"))
        .child(query)
        .child(category)
        .child(DummyView)
        .child(modules.full_height())
}

/// Recompute the module list, keeping the selected entry when it is still
/// listed.
pub fn refresh_modules(s: &mut Cursive) {
    let Some(modules) = with_app(s, |app| app.modules()) else {
        return;
    };
    s.call_on_name(MODULE_LIST, |list: &mut SelectView<String>| {
        let selected = list.selection().map(|label| label.to_string());
        fill(list, &modules);
        let idx = selected.and_then(|sel| list.iter().position(|(label, _)| label == sel));
        if let Some(idx) = idx {
            let _ = list.set_selection(idx);
        }
    });
}

/// Label of the entry selected in the module list.
pub fn selected_label(s: &mut Cursive) -> Option<String> {
    s.call_on_name(MODULE_LIST, |list: &mut SelectView<String>| {
        list.selection().map(|label| label.to_string())
    })
    .flatten()
}
