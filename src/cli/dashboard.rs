use std::path::Path;

use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap,
    },
    DefaultTerminal, Frame,
};

use crate::cli::text::format_validation_totals;
use crate::error::{Result, SpendError};
use crate::filter::{date_bounds, present_categories, CategorySelection};
use crate::fmt::{format_k, number, won};
use crate::insight::OpenAiClient;
use crate::models::Category;
use crate::report::{write_report, REPORT_FILE_NAME};
use crate::session::Session;
use crate::settings::{load_settings, Settings};
use crate::summary::{summarize, Summary};
use crate::tui::{
    with_terminal, won_span, wrap_text, FOOTER_STYLE, HEADER_STYLE, SELECTED_STYLE, WARNING_STYLE,
};

/// How many cleaned rows the preview screen lists.
const PREVIEW_ROWS: usize = 20;

enum Screen {
    Home,
    Insight { scroll: u16 },
    Rows { selected: usize },
}

enum Action {
    Continue,
    Quit,
    FetchInsight,
    WriteReport,
}

struct Dashboard {
    session: Session,
    settings: Settings,
    screen: Screen,
    cursor: usize,
    /// Distinct year-month keys in the data; the month filter cycles through them.
    months: Vec<String>,
    /// Categories with at least one row; the rest are drawn dimmed.
    present: Vec<Category>,
    month_index: Option<usize>,
    status_message: Option<String>,
}

/// First and last day of a "YYYY-MM" key.
fn month_range(year_month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::parse_from_str(&format!("{year_month}-01"), "%Y-%m-%d").ok()?;
    let next = first.checked_add_months(chrono::Months::new(1))?;
    Some((first, next.pred_opt()?))
}

impl Dashboard {
    fn new(session: Session, settings: Settings) -> Self {
        let months = summarize(&session.transactions)
            .monthly
            .into_iter()
            .map(|m| m.year_month)
            .collect();
        let present = present_categories(&session.transactions);
        Self {
            present,
            session,
            settings,
            screen: Screen::Home,
            cursor: 0,
            months,
            month_index: None,
            status_message: None,
        }
    }

    fn current_summary(&self) -> Option<Summary> {
        self.session.summary().ok()
    }

    fn period_label(&self) -> String {
        match self.month_index.and_then(|i| self.months.get(i)) {
            Some(m) => m.clone(),
            None => match date_bounds(&self.session.transactions) {
                Some((from, to)) => format!("{from} ~ {to}"),
                None => "전체".to_string(),
            },
        }
    }

    fn cycle_month(&mut self, forward: bool) {
        if self.months.is_empty() {
            return;
        }
        let len = self.months.len();
        self.month_index = match (self.month_index, forward) {
            (None, true) => Some(0),
            (None, false) => Some(len - 1),
            (Some(i), true) if i + 1 < len => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            _ => None,
        };
        let range = self.month_index.and_then(|i| month_range(&self.months[i]));
        self.session.update_filter(|f| {
            f.from = range.map(|r| r.0);
            f.to = range.map(|r| r.1);
        });
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        self.status_message = None;
        if let Screen::Insight { scroll } = &mut self.screen {
            match code {
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                    self.screen = Screen::Home
                }
                KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
                KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
                KeyCode::Char('e') => return Action::WriteReport,
                KeyCode::Char('q') => return Action::Quit,
                _ => {}
            }
            return Action::Continue;
        }
        if let Screen::Rows { selected } = &mut self.screen {
            let shown = self.session.selected().len().min(PREVIEW_ROWS);
            match code {
                KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace | KeyCode::Char('r') => {
                    self.screen = Screen::Home
                }
                KeyCode::Down | KeyCode::Char('j') if *selected + 1 < shown => *selected += 1,
                KeyCode::Up | KeyCode::Char('k') => *selected = selected.saturating_sub(1),
                KeyCode::Char('q') => return Action::Quit,
                _ => {}
            }
            return Action::Continue;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor = (self.cursor + 1) % Category::ALL.len();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = (self.cursor + Category::ALL.len() - 1) % Category::ALL.len();
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                let cat = Category::ALL[self.cursor];
                self.session.update_filter(|f| f.categories.toggle(cat));
            }
            KeyCode::Char('a') => {
                self.session.update_filter(|f| f.categories = CategorySelection::All);
            }
            KeyCode::Char('n') => {
                self.session
                    .update_filter(|f| f.categories = CategorySelection::Only(vec![]));
            }
            KeyCode::Right | KeyCode::Char(']') => self.cycle_month(true),
            KeyCode::Left | KeyCode::Char('[') => self.cycle_month(false),
            KeyCode::Char('r') => self.screen = Screen::Rows { selected: 0 },
            KeyCode::Char('i') => return Action::FetchInsight,
            KeyCode::Char('e') => return Action::WriteReport,
            _ => {}
        }
        Action::Continue
    }

    fn fetch_insight(&mut self) {
        let result = OpenAiClient::from_settings(&self.settings)
            .and_then(|client| self.session.insight(&client, &self.settings).map(|_| ()));
        match result {
            Ok(()) => self.screen = Screen::Insight { scroll: 0 },
            Err(SpendError::NoMatchingData) => {
                self.status_message = Some(SpendError::NoMatchingData.to_string());
            }
            Err(e) => self.status_message = Some(format!("AI 분석 실패: {e}")),
        }
    }

    fn write_report(&mut self) {
        let path = Path::new(REPORT_FILE_NAME);
        let result = self
            .session
            .render_report(chrono::Local::now().naive_local())
            .and_then(|md| write_report(path, &md));
        self.status_message = Some(match result {
            Ok(()) => format!("Wrote {}", path.display()),
            Err(e) => e.to_string(),
        });
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw(&self, frame: &mut Frame) {
        match self.screen {
            Screen::Home => self.draw_home(frame),
            Screen::Insight { scroll } => self.draw_insight(frame, scroll),
            Screen::Rows { selected } => self.draw_rows(frame, selected),
        }
    }

    fn draw_home(&self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, audit_area, sep1, kpi_area, sep2, body_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);

        let file_name = self
            .session
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(format!(
                " 개인 지출 분석 대시보드  {file_name}  ({}건, 기간: {})",
                number(self.session.transactions.len() as f64),
                self.period_label()
            ))
            .style(HEADER_STYLE),
            header_area,
        );
        frame.render_widget(
            Paragraph::new(format!(
                " {}",
                format_validation_totals(&self.session.validation)
            ))
            .style(FOOTER_STYLE),
            audit_area,
        );

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        let [charts_area, picker_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(26)]).areas(body_area);

        match self.current_summary() {
            Some(summary) => {
                self.draw_kpis(frame, kpi_area, &summary);
                self.draw_charts(frame, charts_area, &summary);
            }
            None => {
                frame.render_widget(
                    Paragraph::new(format!(" {}", SpendError::NoMatchingData)).style(WARNING_STYLE),
                    kpi_area,
                );
            }
        }
        self.draw_picker(frame, picker_area);

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(WARNING_STYLE),
                hints_area,
            );
        } else {
            frame.render_widget(
                Paragraph::new(
                    " Up/Down=category  Space=toggle  a=all  n=none  Left/Right=month  \
                     r=rows  i=AI  e=report  q=quit",
                )
                .style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn draw_kpis(&self, frame: &mut Frame, area: ratatui::layout::Rect, summary: &Summary) {
        let cols: [ratatui::layout::Rect; 4] =
            Layout::horizontal([Constraint::Ratio(1, 4); 4]).areas(area);
        let items = [
            ("총 지출", won_span(summary.total)),
            ("평균 지출", won_span(summary.average)),
            ("최대 지출", won_span(summary.max)),
            ("거래 건수", Span::raw(format!("{}건", number(summary.count as f64)))),
        ];
        for ((label, value), col) in items.into_iter().zip(cols) {
            let lines = vec![
                Line::from(Span::styled(
                    format!(" {label}"),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![Span::raw(" "), value]),
            ];
            frame.render_widget(Paragraph::new(lines), col);
        }
    }

    fn draw_charts(&self, frame: &mut Frame, area: ratatui::layout::Rect, summary: &Summary) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);

        // Category shares, horizontal bars
        let bars: Vec<Bar> = summary
            .categories
            .iter()
            .map(|c| {
                Bar::default()
                    .value(c.amount.max(0.0) as u64)
                    .label(Line::from(c.category.label()))
                    .text_value(format!("{:.1}%", c.percentage))
            })
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .title("카테고리별 지출 비율")
                    .title_style(Style::default().add_modifier(Modifier::BOLD))
                    .borders(Borders::NONE),
            )
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(Color::Rgb(255, 140, 90)))
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, left);

        // Monthly trend
        let max_val = summary
            .monthly
            .iter()
            .map(|m| m.amount)
            .fold(0.0_f64, f64::max);
        let month_bars: Vec<Bar> = summary
            .monthly
            .iter()
            .map(|m| {
                let label = m.year_month.get(2..).unwrap_or(&m.year_month).to_string();
                Bar::default()
                    .value(m.amount.max(0.0) as u64)
                    .label(Line::from(label))
                    .text_value(format_k(m.amount))
            })
            .collect();
        let chart = BarChart::default()
            .block(
                Block::default()
                    .title(format!("월별 지출 추이 (최대 {})", format_k(max_val)))
                    .title_style(Style::default().add_modifier(Modifier::BOLD))
                    .borders(Borders::NONE),
            )
            .bar_width(5)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Rgb(80, 160, 255)))
            .data(BarGroup::default().bars(&month_bars));
        frame.render_widget(chart, right);
    }

    fn draw_picker(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let selection = &self.session.filter().categories;
        let mut lines = vec![Line::from(Span::styled(
            " 카테고리 선택",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (i, cat) in Category::ALL.iter().enumerate() {
            let mark = if selection.contains(*cat) { "[x]" } else { "[ ]" };
            let style = if i == self.cursor {
                SELECTED_STYLE
            } else if self.present.contains(cat) {
                Style::default()
            } else {
                FOOTER_STYLE
            };
            lines.push(Line::from(Span::styled(format!(" {mark} {cat}"), style)));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_rows(&self, frame: &mut Frame, selected: usize) {
        let area = frame.area();
        let [header_area, table_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        let rows = self.session.selected();
        let shown = rows.len().min(PREVIEW_ROWS);
        frame.render_widget(
            Paragraph::new(format!(
                " 전처리된 데이터 미리보기  ({shown} / {}건, 기간: {})",
                number(rows.len() as f64),
                self.period_label()
            ))
            .style(HEADER_STYLE),
            header_area,
        );

        if rows.is_empty() {
            frame.render_widget(
                Paragraph::new(format!(" {}", SpendError::NoMatchingData)).style(WARNING_STYLE),
                table_area,
            );
        } else {
            let rendered: Vec<Row> = rows
                .iter()
                .take(PREVIEW_ROWS)
                .map(|t| {
                    Row::new(vec![
                        Cell::from(t.date.to_string()),
                        Cell::from(Line::from(won(t.amount)).right_aligned()),
                        Cell::from(t.category.label()),
                        Cell::from(t.description.clone()),
                        Cell::from(t.payment_method.clone()),
                        Cell::from(if t.is_fixed { "고정" } else { "" }),
                    ])
                })
                .collect();
            let widths = [
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(4),
            ];
            let header = ["날짜", "금액", "카테고리", "내역", "결제수단", "고정"];
            let table = Table::new(rendered, widths)
                .header(Row::new(header).style(HEADER_STYLE).bottom_margin(1))
                .column_spacing(1)
                .row_highlight_style(SELECTED_STYLE);
            let mut state = TableState::default().with_selected(Some(selected));
            frame.render_stateful_widget(table, table_area, &mut state);
        }

        frame.render_widget(
            Paragraph::new(" Up/Down=move  Esc=back  q=quit").style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn draw_insight(&self, frame: &mut Frame, scroll: u16) {
        let area = frame.area();
        let [header_area, body_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" AI 지출 분석  ({})", self.period_label())).style(HEADER_STYLE),
            header_area,
        );
        let text = self.session.cached_insight().unwrap_or_default();
        let (wrapped, _) = wrap_text(text, body_area.width.saturating_sub(4) as usize);
        frame.render_widget(
            Paragraph::new(wrapped)
                .block(Block::default().borders(Borders::ALL).border_style(FOOTER_STYLE))
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0)),
            body_area,
        );
        let hint = self
            .status_message
            .clone()
            .unwrap_or_else(|| " Up/Down=scroll  e=write report  Esc=back  q=quit".to_string());
        frame.render_widget(Paragraph::new(hint).style(FOOTER_STYLE), hints_area);
    }
}

fn event_loop(terminal: &mut DefaultTerminal, dash: &mut Dashboard) -> Result<()> {
    loop {
        terminal.draw(|frame| dash.draw(frame))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(());
        }
        match dash.handle_key(key.code) {
            Action::Quit => return Ok(()),
            Action::Continue => {}
            Action::FetchInsight => {
                // The request blocks; show the pending state first.
                dash.status_message =
                    Some(format!("AI 분석 요청 중... (최대 {}초)", dash.settings.timeout_secs));
                terminal.draw(|frame| dash.draw(frame))?;
                dash.fetch_insight();
            }
            Action::WriteReport => dash.write_report(),
        }
    }
}

pub fn run(file: &str) -> Result<()> {
    let session = Session::open(Path::new(file))?;
    if session.transactions.is_empty() {
        return Err(SpendError::Other(format!(
            "{file} has no usable rows after cleaning"
        )));
    }
    let mut dash = Dashboard::new(session, load_settings());
    with_terminal(|terminal| event_loop(terminal, &mut dash))
}
