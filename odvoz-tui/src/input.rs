use chrono::TimeDelta;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use odvoz_core::model::NotifyBefore;

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `session.select_municipality`(...) for the highlighted entry
    SelectMunicipality,
    /// Re-fetch the schedule for the currently selected municipality
    Refresh,
    /// Persist the settings via the settings store
    SaveSettings,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Esc, Left, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::MunicipalitySelect => match key.code {
            Up | Char('k') => {
                if app.municipality_index > 0 {
                    app.municipality_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.municipality_index + 1 < app.municipalities.len() {
                    app.municipality_index += 1;
                }
            }
            Enter | Char(' ') => {
                action = Action::SelectMunicipality;
            }
            _ => {}
        },

        Screen::Schedule => match key.code {
            Char('c') => {
                app.screen = Screen::Calendar;
            }
            Char('s') => {
                app.screen = Screen::Settings;
            }
            Char('r') => {
                action = Action::Refresh;
            }
            Left | Esc => {
                app.screen = Screen::MunicipalitySelect;
            }
            _ => {}
        },

        Screen::Calendar => match key.code {
            Left | Esc | Char('b') => {
                app.screen = Screen::Schedule;
            }
            Char('s') => {
                app.screen = Screen::Settings;
            }
            _ => {}
        },

        Screen::Settings => match key.code {
            Char('n') => {
                app.settings.notifications_enabled = !app.settings.notifications_enabled;
            }
            Char('b') => {
                app.settings.notify_before = match app.settings.notify_before {
                    NotifyBefore::OnDay => NotifyBefore::DayBefore,
                    NotifyBefore::DayBefore => NotifyBefore::OnDay,
                };
            }
            Up | Char('+') => {
                app.settings.notification_time = app
                    .settings
                    .notification_time
                    .overflowing_add_signed(TimeDelta::hours(1))
                    .0;
            }
            Down | Char('-') => {
                app.settings.notification_time = app
                    .settings
                    .notification_time
                    .overflowing_sub_signed(TimeDelta::hours(1))
                    .0;
            }
            Enter => {
                action = Action::SaveSettings;
            }
            Left | Esc => {
                app.screen = Screen::Schedule;
            }
            _ => {}
        },
    }
    action
}
