use std::sync::Arc;

use chrono::Local;
use odvoz_core::{
    aggregate::Aggregation,
    model::{MunicipalityId, MunicipalityMeta, Settings},
    partition::Partitions,
    ports::ScheduleProvider,
    session::ScheduleSession,
};

use crate::settings_file::JsonSettingsStore;

#[derive(Debug, Clone, Copy)]
pub(crate) enum Screen {
    MunicipalitySelect,
    Schedule,
    Calendar,
    Settings,
}

pub(crate) struct App {
    pub session: ScheduleSession,
    pub schedules: Arc<dyn ScheduleProvider>,
    pub settings_store: JsonSettingsStore,
    pub settings: Settings,

    pub screen: Screen,
    pub municipalities: Vec<MunicipalityMeta>,
    pub municipality_index: usize,

    // Views refreshed from the session before every draw; cheap because
    // the session memoizes them per batch.
    pub markers: Arc<Aggregation>,
    pub partitions: Arc<Partitions>,
    pub warnings: u32,

    pub error_message: Option<String>,
}

impl App {
    pub(crate) fn new(
        session: ScheduleSession,
        schedules: Arc<dyn ScheduleProvider>,
        settings_store: JsonSettingsStore,
        settings: Settings,
        municipalities: Vec<MunicipalityMeta>,
    ) -> Self {
        let municipality_index = settings
            .selected_municipality_id
            .as_ref()
            .and_then(|selected| {
                municipalities
                    .iter()
                    .position(|municipality| municipality.id == *selected)
            })
            .unwrap_or(0);

        let screen = if settings.selected_municipality_id.is_some() {
            Screen::Schedule
        } else {
            Screen::MunicipalitySelect
        };

        let mut app = Self {
            session,
            schedules,
            settings_store,
            settings,
            screen,
            municipalities,
            municipality_index,
            markers: Arc::new(Aggregation::default()),
            partitions: Arc::new(Partitions::default()),
            warnings: 0,
            error_message: None,
        };
        app.refresh_views();
        app
    }

    /// Pull the current derived views out of the session.
    pub(crate) fn refresh_views(&mut self) {
        let today = Local::now().date_naive();
        self.markers = self.session.markers();
        self.partitions = self.session.partitions(today);
        self.warnings = self.session.warnings();
    }

    pub(crate) fn highlighted_municipality(&self) -> Option<&MunicipalityMeta> {
        self.municipalities.get(self.municipality_index)
    }

    pub(crate) fn select_current_municipality(&mut self) -> Option<MunicipalityId> {
        let municipality = self.highlighted_municipality()?;
        let id = municipality.id.clone();
        self.screen = Screen::Schedule;
        Some(id)
    }

    pub(crate) fn selected_municipality_name(&self) -> &str {
        self.session
            .selected_municipality()
            .and_then(|selected| {
                self.municipalities
                    .iter()
                    .find(|municipality| municipality.id == *selected)
            })
            .map_or("<no municipality>", |municipality| {
                municipality.name.as_str()
            })
    }
}
