use chrono::{Local, NaiveDate};
use odvoz_core::classify::{CategoryTag, WasteCategory};
use odvoz_core::model::{MarkerEntry, NotifyBefore, PickupRecord};
use odvoz_core::session::SessionPhase;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("odvoz – municipal waste pickup reminders")
        .block(Block::default().borders(Borders::ALL).title("Odvoz"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::MunicipalitySelect => draw_municipality_select(frame, app, *content_area),
        Screen::Schedule => draw_schedule(frame, app, *content_area),
        Screen::Calendar => draw_calendar(frame, app, *content_area),
        Screen::Settings => draw_settings(frame, app, *content_area),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::MunicipalitySelect => "↑/↓ move · Enter/Space select municipality · q/Ctrl-C quit",
        Screen::Schedule => {
            "c calendar · s settings · r refresh · Left/Esc change municipality · q/Ctrl-C quit"
        }
        Screen::Calendar => "Esc/←/b back to schedule · s settings · q/Ctrl-C quit",
        Screen::Settings => {
            "n notifications · b timing · ↑/↓ hour · Enter save · Esc back · q/Ctrl-C quit"
        }
    };

    let is_loading = app.session.phase() == SessionPhase::Loading;

    let mut status_text = if is_loading {
        format!("Loading… · {nav_hint}")
    } else if let Some(msg) = &app.error_message {
        format!("{msg} · {nav_hint}")
    } else {
        nav_hint.to_owned()
    };
    if app.warnings > 0 {
        status_text = format!("{} malformed record(s) skipped · {status_text}", app.warnings);
    }

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else if is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_municipality_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = app
        .municipalities
        .iter()
        .enumerate()
        .map(|(idx, municipality)| {
            let prefix = if idx == app.municipality_index {
                "> "
            } else {
                "  "
            };
            ListItem::new(format!("{prefix}{}", municipality.name))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select municipality (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.municipalities.is_empty() {
        state.select(Some(app.municipality_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_schedule(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let municipality = app.selected_municipality_name();
    let title = format!("Pickups in {municipality} (c calendar, s settings, r refresh)");

    if app.session.phase() == SessionPhase::Loading {
        let paragraph = Paragraph::new("Loading schedule…")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let partitions = &app.partitions;
    if partitions.today.is_empty() && partitions.upcoming.is_empty() && partitions.past.is_empty() {
        let paragraph = Paragraph::new("No pickup dates for this municipality.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let today = Local::now().date_naive();

    let today_rows = partitions
        .today
        .iter()
        .map(|record| pickup_row(record, today).style(Style::default().add_modifier(Modifier::BOLD)));
    let upcoming_rows = partitions
        .upcoming
        .iter()
        .map(|record| pickup_row(record, today));
    let past_rows = partitions.past.iter().map(|record| {
        pickup_row(record, today)
            .style(Style::default().fg(Color::DarkGray))
    });

    let rows: Vec<Row<'_>> = today_rows.chain(upcoming_rows).chain(past_rows).collect();

    let column_widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Date", "Day", "In", "Waste"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn pickup_row(record: &PickupRecord, today: NaiveDate) -> Row<'static> {
    let date = record.date.format("%d.%m.%Y").to_string();
    let weekday = record.date.format("%a").to_string();
    let relative = relative_day_label(record.date, today);
    let label = record.category.label().to_owned();

    Row::new(vec![
        Cell::from(date),
        Cell::from(weekday),
        Cell::from(relative),
        Cell::from(label).style(Style::default().fg(category_color(&record.category))),
    ])
}

fn draw_calendar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let municipality = app.selected_municipality_name();
    let title = format!("Calendar markers for {municipality} (Esc/←/b back)");

    if app.markers.markers.is_empty() {
        let paragraph = Paragraph::new("No marked dates.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let mut entries: Vec<&MarkerEntry> = app.markers.markers.values().collect();
    entries.sort_by_key(|entry| entry.date_key);

    let today = Local::now().date_naive();

    let items = entries
        .into_iter()
        .map(|entry| {
            let mut spans = vec![Span::raw(format!("{}  ", entry.date_key))];
            for category in entry.dots() {
                spans.push(Span::styled(
                    "● ",
                    Style::default().fg(category_color(category)),
                ));
            }
            spans.push(Span::raw("  "));
            let labels = entry
                .dots()
                .iter()
                .map(WasteCategory::label)
                .collect::<Vec<&str>>()
                .join(", ");
            spans.push(Span::raw(labels));

            let mut line = Line::from(spans);
            if entry.date_key.date() < today {
                line = line.style(Style::default().fg(Color::DarkGray));
            } else if entry.date_key.date() == today {
                line = line.style(Style::default().add_modifier(Modifier::BOLD));
            }
            ListItem::new(line)
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_settings(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let notifications = if app.settings.notifications_enabled {
        "enabled"
    } else {
        "disabled"
    };
    let timing = match app.settings.notify_before {
        NotifyBefore::OnDay => "on the pickup day",
        NotifyBefore::DayBefore => "the day before",
    };

    let lines = vec![
        Line::from(format!("Municipality:      {}", app.selected_municipality_name())),
        Line::from(format!("Notifications:     {notifications} (n to toggle)")),
        Line::from(format!(
            "Notification time: {} (↑/↓ to adjust)",
            app.settings.notification_time.format("%H:%M")
        )),
        Line::from(format!("Remind me:         {timing} (b to switch)")),
        Line::from(""),
        Line::from("Enter saves, Esc goes back without saving."),
    ];

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Settings"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn category_color(category: &WasteCategory) -> Color {
    match category {
        WasteCategory::Paper => Color::Blue,
        WasteCategory::Plastic => Color::Yellow,
        WasteCategory::Bio => Color::Green,
        WasteCategory::General => Color::Gray,
        WasteCategory::Other(_) => tag_color(category.tag()),
    }
}

fn tag_color(tag: CategoryTag) -> Color {
    match tag {
        CategoryTag::Recycling => Color::Cyan,
        CategoryTag::Organic => Color::Green,
        CategoryTag::Residual => Color::Gray,
        CategoryTag::Unclassified => Color::Magenta,
    }
}

fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let delta = (date - today).num_days();
    match delta {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days if days > 1 => format!("in {days} days"),
        -1 => "yesterday".to_owned(),
        days => format!("{} days ago", days.abs()),
    }
}
