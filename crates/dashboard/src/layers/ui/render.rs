use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Axis, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Wrap};

use super::app::{AppState, InputMode, Pane, PathTarget};
use super::format::{
    financial_lines, form_lines, results_lines, suggestions_line, transcript_lines, StyledLine,
};
use super::text::{truncate_with_ellipsis, wrap_text_lines};
use super::theme::{hex_color, Theme, ValueStyle};
use crate::layers::session::financial::FinancialField;
use crate::layers::session::privacy::shown;
use crate::layers::session::results::ChartInstance;

const CALCULATOR_HEIGHT: u16 = 14;
const CHART_HEIGHT: u16 = 12;
const METER_HEIGHT: u16 = 3;

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &mut AppState) {
    let theme = Theme::dark();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(CALCULATOR_HEIGHT)])
        .split(body[0]);

    let mut right_constraints = vec![Constraint::Min(6)];
    let chart_visible = app.view.chart.current().is_some();
    if chart_visible {
        right_constraints.push(Constraint::Length(CHART_HEIGHT));
    }
    if app.view.assistant.open {
        right_constraints.push(Constraint::Percentage(40));
    }
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints(right_constraints)
        .split(body[1]);

    draw_header(frame, app, &theme, chunks[0]);
    draw_form(frame, app, &theme, left[0]);
    draw_calculator(frame, app, &theme, left[1]);
    draw_results(frame, app, &theme, right[0]);
    let mut next = 1;
    if chart_visible {
        if let Some(chart) = app.view.chart.current() {
            draw_chart(frame, chart, &theme, right[next]);
        }
        next += 1;
    }
    if app.view.assistant.open {
        draw_assistant(frame, app, &theme, right[next]);
    }
    draw_footer(frame, app, &theme, chunks[2]);

    if app.view.loading.active {
        draw_loading(frame, &app.view.loading.status, &theme, right[0]);
    }
    if let InputMode::PathPrompt(target) = app.mode {
        draw_path_prompt(frame, target, &app.path_input, &theme);
    }
    if let Some(alert) = app.view.alert {
        draw_popup(
            frame,
            &theme,
            "Alert",
            vec![
                Line::styled(alert.message(), theme.alert_style()),
                Line::from(""),
                Line::styled("Enter/Esc=dismiss", theme.help_style()),
            ],
        );
    }
}

fn styled_text(theme: &Theme, lines: &[StyledLine], width: u16) -> Vec<Line<'static>> {
    let width = width.max(1) as usize;
    let mut out = Vec::new();
    for line in lines {
        let style = theme.tone_style(&line.tone);
        for wrapped in wrap_text_lines(&line.text, width) {
            out.push(Line::styled(wrapped, style));
        }
    }
    out
}

fn draw_header(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let url_width = area.width.saturating_sub(40) as usize;
    let mut spans = vec![
        Span::styled("CupidSecure", theme.accent_style()),
        Span::styled("  backend: ", theme.help_style()),
        Span::styled(
            truncate_with_ellipsis(&app.backend_url, url_width),
            theme.value_style(ValueStyle::Important),
        ),
    ];
    if app.view.redacted {
        spans.push(Span::styled("  PRIVACY ON", theme.warn_style()));
    }
    let header = Paragraph::new(Line::from(spans))
        .block(theme.block("Romance Scam Risk", false))
        .style(theme.value_style(ValueStyle::Normal));
    frame.render_widget(header, area);
}

fn draw_form(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let focused = app.pane == Pane::Form;
    let title = match app.mode {
        InputMode::EditSender if focused => "Conversation (editing sender)",
        InputMode::EditText if focused => "Conversation (editing message)",
        _ => "Conversation",
    };
    let block = theme.block(title, focused);
    let inner = block.inner(area);
    let lines = styled_text(theme, &form_lines(&app.view), inner.width);
    let form = Paragraph::new(Text::from(lines)).block(block);
    frame.render_widget(Clear, area);
    frame.render_widget(form, area);
}

fn draw_calculator(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let focused = app.pane == Pane::Calculator;
    let form = &app.view.financial.form;
    let editing = focused && app.mode == InputMode::CalcField;
    let field = |label: &str, which: FinancialField, value: String| {
        let selected = focused && form.focus == which;
        let marker = if selected { "> " } else { "  " };
        let cursor = if selected && editing { "█" } else { "" };
        let style = if selected {
            theme.highlight_style()
        } else {
            theme.value_style(ValueStyle::Normal)
        };
        Line::from(vec![
            Span::styled(format!("{marker}{label}: "), theme.help_style()),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    };
    let mut lines = vec![
        field(
            "Amount ($)",
            FinancialField::Amount,
            shown(&form.amount, app.view.redacted).into_owned(),
        ),
        field(
            "Reason",
            FinancialField::Reason,
            shown(&form.reason, app.view.redacted).into_owned(),
        ),
        field(
            "Payment method",
            FinancialField::PaymentMethod,
            form.payment_method().to_string(),
        ),
        field(
            "Days talking",
            FinancialField::RelationshipDays,
            form.relationship_days.clone(),
        ),
        Line::from(""),
    ];
    let block = theme.block("Financial Risk Calculator", focused);
    let inner = block.inner(area);
    lines.extend(styled_text(theme, &financial_lines(&app.view.financial), inner.width));
    let calculator = Paragraph::new(Text::from(lines)).block(block);
    frame.render_widget(Clear, area);
    frame.render_widget(calculator, area);
}

fn draw_results(frame: &mut ratatui::Frame, app: &mut AppState, theme: &Theme, area: Rect) {
    let focused = app.pane == Pane::Results;
    let block = theme.block("Analysis Results", focused);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let (meter_area, text_area) = if app.view.last_result.is_some() && inner.height > METER_HEIGHT
    {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(METER_HEIGHT), Constraint::Min(1)])
            .split(inner);
        (Some(split[0]), split[1])
    } else {
        (None, inner)
    };

    if let Some(meter_area) = meter_area {
        let meter = &app.view.results.meter;
        let color = hex_color(&meter.color).unwrap_or(ratatui::style::Color::White);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .ratio(meter.ratio())
            .label(format!("{} / 100  {}", meter.score, meter.message));
        frame.render_widget(gauge, meter_area);
    }

    let lines = styled_text(theme, &results_lines(&app.view), text_area.width);
    app.set_result_metrics(lines.len(), text_area.height);
    let results = Paragraph::new(Text::from(lines)).scroll((app.view.results.scroll, 0));
    frame.render_widget(results, text_area);
}

fn draw_chart(frame: &mut ratatui::Frame, chart: &ChartInstance, theme: &Theme, area: Rect) {
    let points: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(index, score)| (index as f64, f64::from(*score)))
        .collect();
    let x_max = (points.len().saturating_sub(1)).max(1) as f64;
    let x_labels: Vec<String> = match (chart.labels.first(), chart.labels.last()) {
        (Some(first), Some(last)) if chart.labels.len() > 1 => {
            vec![first.clone(), last.clone()]
        }
        (Some(only), _) => vec![only.clone()],
        _ => Vec::new(),
    };
    let dataset = Dataset::default()
        .name(chart.label)
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(theme.accent_style())
        .data(&points);
    let widget = Chart::new(vec![dataset])
        .block(theme.block(chart.label, false))
        .x_axis(
            Axis::default()
                .style(theme.help_style())
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.help_style())
                .bounds([0.0, 100.0])
                .labels(["0", "50", "100"]),
        );
    frame.render_widget(Clear, area);
    frame.render_widget(widget, area);
}

fn draw_assistant(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let focused = app.pane == Pane::Assistant;
    let block = theme.block("Cupid AI", focused);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let assistant = &app.view.assistant;
    let lines = styled_text(theme, &transcript_lines(assistant), split[0].width);
    let follow = lines.len().saturating_sub(split[0].height as usize);
    let transcript = Paragraph::new(Text::from(lines))
        .scroll((u16::try_from(follow).unwrap_or(u16::MAX), 0));
    frame.render_widget(transcript, split[0]);

    let suggestions = truncate_with_ellipsis(&suggestions_line(assistant), split[1].width as usize);
    frame.render_widget(
        Paragraph::new(Line::styled(suggestions, theme.help_style())),
        split[1],
    );

    let typing = focused && app.mode == InputMode::ChatInput;
    let input_style = if typing {
        theme.highlight_style()
    } else {
        theme.value_style(ValueStyle::Dim)
    };
    let cursor = if typing { "█" } else { "" };
    let input = Line::from(vec![
        Span::styled("> ", theme.accent_style()),
        Span::styled(format!("{}{cursor}", assistant.input), input_style),
    ]);
    frame.render_widget(Paragraph::new(input), split[2]);
}

fn pane_help(app: &AppState) -> &'static str {
    match (app.mode, app.pane) {
        (InputMode::PathPrompt(_), _) => "type a path  Enter=attach  Esc=cancel  ",
        (InputMode::EditSender | InputMode::EditText | InputMode::CalcField, _) => {
            "type to edit  Enter=done  Esc=done  "
        }
        (InputMode::ChatInput, _) => "type a question  Enter=send  Esc=stop typing  ",
        (InputMode::Normal, Pane::Form) => {
            "j/k=row  e=edit  s=sender  a=add  x=remove  i=screenshot  c=clear  1/2=demo  "
        }
        (InputMode::Normal, Pane::Results) => {
            "j/k=scroll  gg/G=top/bottom  d/v/b=scripts  "
        }
        (InputMode::Normal, Pane::Assistant) => {
            "i=type  n=next tip  u=use tip  m=image  o=close  "
        }
        (InputMode::Normal, Pane::Calculator) => {
            "j/k=field  Enter=edit  Space=method  c=calculate  "
        }
    }
}

fn draw_footer(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let mut footer_spans = vec![
        Span::styled(pane_help(app), theme.help_style()),
        Span::styled(
            "A=analyze  P=privacy  R=report  o=assistant  Tab=focus  q=quit  ",
            theme.help_style(),
        ),
    ];
    if app.confirm_quit {
        footer_spans.push(Span::styled(
            "press q again to quit / Esc to cancel  ",
            theme.warn_style(),
        ));
    } else if let Some(notice) = &app.view.notice {
        footer_spans.push(Span::styled(notice.clone(), theme.accent_style()));
    } else if app.pane == Pane::Results && app.view.results.visible {
        footer_spans.push(Span::styled(
            format!(
                "line {}/{}",
                app.result_scroll().saturating_add(1),
                app.result_total_lines
            ),
            theme.accent_style(),
        ));
    }
    let footer = Paragraph::new(Line::from(footer_spans))
        .block(theme.block("Controls", false))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, area);
}

fn draw_loading(frame: &mut ratatui::Frame, status: &str, theme: &Theme, area: Rect) {
    let popup = centered_rect(area, 30, 5);
    let text = vec![
        Line::styled(status.to_string(), theme.warn_style()),
        Line::styled("Please wait", theme.help_style()),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text).block(theme.block("Working", true)),
        popup,
    );
}

fn draw_path_prompt(frame: &mut ratatui::Frame, target: PathTarget, input: &str, theme: &Theme) {
    let title = match target {
        PathTarget::Screenshot => "Screenshot path",
        PathTarget::ChatImage => "Image for Cupid AI",
    };
    let popup = centered_rect(frame.area(), 70, 5);
    let text = vec![
        Line::from(vec![
            Span::styled("> ", theme.accent_style()),
            Span::styled(format!("{input}█"), theme.highlight_style()),
        ]),
        Line::styled("Enter=attach  Esc=cancel", theme.help_style()),
    ];
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(theme.block(title, true)), popup);
}

fn draw_popup(frame: &mut ratatui::Frame, theme: &Theme, title: &str, lines: Vec<Line>) {
    let popup = centered_rect(frame.area(), 60, lines.len() as u16 + 2);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .block(theme.block(title, true))
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
