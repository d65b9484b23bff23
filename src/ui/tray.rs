use gtk::prelude::*;
use libappindicator::{AppIndicator, AppIndicatorStatus};
use std::cell::RefCell;
use std::rc::Rc;

use super::display::{self, DisplayUpdate, PLACEHOLDER_TITLE};
use crate::config::Settings;

/// Callbacks for tray menu actions
pub struct TrayCallbacks {
    pub on_configure: Box<dyn Fn()>,
    pub on_quit: Box<dyn Fn()>,
}

impl Default for TrayCallbacks {
    fn default() -> Self {
        Self {
            on_configure: Box::new(|| {}),
            on_quit: Box::new(|| {}),
        }
    }
}

/// Manages the indicator label and its menu
pub struct TrayManager {
    indicator: AppIndicator,
    callbacks: Rc<RefCell<TrayCallbacks>>,
    error_item: gtk::MenuItem,
    hint_items: [gtk::MenuItem; 3],
    status_item: gtk::MenuItem,
    last_title: String,
}

impl TrayManager {
    pub fn new(settings: &Settings) -> Self {
        let mut indicator = AppIndicator::new("kernel-task-monitor", "utilities-system-monitor");
        indicator.set_status(AppIndicatorStatus::Active);
        indicator.set_title(&display::tooltip(settings));
        indicator.set_label(PLACEHOLDER_TITLE, "");

        let mut menu = gtk::Menu::new();
        let callbacks = Rc::new(RefCell::new(TrayCallbacks::default()));

        let configure_item = gtk::MenuItem::with_label("Configure...");
        let callbacks_ref = callbacks.clone();
        configure_item.connect_activate(move |_| {
            (callbacks_ref.borrow().on_configure)();
        });
        menu.append(&configure_item);

        let endpoint_item = gtk::MenuItem::with_label(&display::endpoint_line(settings));
        endpoint_item.set_sensitive(false);
        menu.append(&endpoint_item);

        menu.append(&gtk::SeparatorMenuItem::new());

        // Error block, visible only while sampling fails
        let error_item = gtk::MenuItem::with_label("");
        error_item.set_sensitive(false);
        menu.append(&error_item);
        let hint_items = [
            gtk::MenuItem::with_label(""),
            gtk::MenuItem::with_label(""),
            gtk::MenuItem::with_label(""),
        ];
        for item in &hint_items {
            menu.append(item);
        }

        menu.append(&gtk::SeparatorMenuItem::new());

        let status_item = gtk::MenuItem::with_label("State: Unknown");
        status_item.set_sensitive(false);
        menu.append(&status_item);

        let settings_item = gtk::MenuItem::with_label(&display::settings_line(settings));
        settings_item.set_sensitive(false);
        menu.append(&settings_item);

        menu.append(&gtk::SeparatorMenuItem::new());

        let note_item = gtk::MenuItem::with_label("Changes require restart");
        note_item.set_sensitive(false);
        menu.append(&note_item);

        let quit_item = gtk::MenuItem::with_label("Quit");
        let callbacks_ref = callbacks.clone();
        quit_item.connect_activate(move |_| {
            (callbacks_ref.borrow().on_quit)();
        });
        menu.append(&quit_item);

        menu.show_all();
        error_item.hide();
        for item in &hint_items {
            item.hide();
        }
        indicator.set_menu(&mut menu);

        Self {
            indicator,
            callbacks,
            error_item,
            hint_items,
            status_item,
            last_title: PLACEHOLDER_TITLE.to_string(),
        }
    }

    pub fn set_callbacks(&self, callbacks: TrayCallbacks) {
        *self.callbacks.borrow_mut() = callbacks;
    }

    /// Show the state rendered by the poll worker
    pub fn apply(&mut self, update: &DisplayUpdate) {
        if update.title != self.last_title {
            self.indicator.set_label(&update.title, "");
            self.last_title = update.title.clone();
        }
        self.status_item.set_label(&update.status);

        match &update.error {
            Some(report) => {
                self.error_item.set_label(&report.line());
                self.error_item.show();
                for (item, hint) in self.hint_items.iter().zip(report.hints.iter()) {
                    item.set_label(hint);
                    item.show();
                }
            }
            None => {
                self.error_item.hide();
                for item in &self.hint_items {
                    item.hide();
                }
            }
        }
    }

    /// Hide the tray icon
    pub fn hide(&mut self) {
        self.indicator.set_status(AppIndicatorStatus::Passive);
    }
}
