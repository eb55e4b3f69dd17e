//! Billing: invoice table with a status filter and payment entry.

use crate::api::{ApiClient, ApiError, ApiResult};
use crate::app::SelectedPage;
use crate::components::{palette, render_header, render_help, Component, StatusMessage};
use crate::models::{Invoice, InvoiceStatus};
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use tracing::warn;

const FILTERS: [Option<InvoiceStatus>; 6] = [
    None,
    Some(InvoiceStatus::Pending),
    Some(InvoiceStatus::PartiallyPaid),
    Some(InvoiceStatus::Overdue),
    Some(InvoiceStatus::Paid),
    Some(InvoiceStatus::Cancelled),
];

pub struct Billing {
    api: ApiClient,
    invoices: Vec<Invoice>,
    filter_index: usize,
    table_state: TableState,
    payment_input: Option<String>,
    status: StatusMessage,
}

impl Billing {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            invoices: Vec::new(),
            filter_index: 0,
            table_state: TableState::default(),
            payment_input: None,
            status: StatusMessage::default(),
        }
    }

    pub fn refresh(&mut self) -> ApiResult<()> {
        match self.api.list_invoices() {
            Ok(invoices) => {
                self.invoices = invoices;
                if self.table_state.selected().is_none() && !self.invoices.is_empty() {
                    self.table_state.select(Some(0));
                }
                Ok(())
            }
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "failed to fetch invoices");
                self.status.error(format!("Failed to load invoices: {e}"));
                Ok(())
            }
        }
    }

    fn filtered(&self) -> Vec<&Invoice> {
        match FILTERS[self.filter_index] {
            None => self.invoices.iter().collect(),
            Some(status) => self.invoices.iter().filter(|i| i.status == status).collect(),
        }
    }

    fn selected_invoice(&self) -> Option<&Invoice> {
        self.table_state
            .selected()
            .and_then(|i| self.filtered().get(i).copied())
    }

    fn move_selection(&mut self, delta: i64) {
        let len = self.filtered().len() as i64;
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as i64;
        self.table_state
            .select(Some(((current + delta).rem_euclid(len)) as usize));
    }

    fn record_payment(&mut self, amount_text: &str) -> Result<Option<SelectedPage>> {
        let Some(invoice) = self.selected_invoice() else {
            return Ok(None);
        };
        let invoice_id = invoice.id;
        let balance = invoice.balance();
        let amount: f64 = match amount_text.trim().parse() {
            Ok(a) if a > 0.0 => a,
            _ => {
                self.status.error("Enter a positive payment amount.");
                return Ok(None);
            }
        };
        if amount > balance + 0.005 {
            self.status
                .error(format!("Payment exceeds the ${balance:.2} balance."));
            return Ok(None);
        }
        match self.api.record_payment(invoice_id, amount) {
            Ok(updated) => {
                if let Some(row) = self.invoices.iter_mut().find(|i| i.id == invoice_id) {
                    *row = updated;
                }
                self.status.success(format!("Payment of ${amount:.2} recorded."));
                Ok(None)
            }
            Err(e) if e.is_unauthorized() => Ok(Some(SelectedPage::Logout)),
            Err(ApiError::Validation { message, .. }) => {
                self.status.error(message);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, invoice_id, "failed to record payment");
                self.status.error(format!("Failed to record payment: {e}"));
                Ok(None)
            }
        }
    }
}

impl Component for Billing {
    fn handle_input(&mut self, event: KeyEvent) -> Result<Option<SelectedPage>> {
        // Payment entry grabs the keyboard while open.
        if let Some(mut input) = self.payment_input.take() {
            match event.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    input.push(c);
                    self.payment_input = Some(input);
                }
                KeyCode::Backspace => {
                    input.pop();
                    self.payment_input = Some(input);
                }
                KeyCode::Enter => return self.record_payment(&input),
                KeyCode::Esc => {}
                _ => self.payment_input = Some(input),
            }
            return Ok(None);
        }

        match event.code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.filter_index = (self.filter_index + 1) % FILTERS.len();
                self.table_state.select(if self.filtered().is_empty() {
                    None
                } else {
                    Some(0)
                });
            }
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Enter => {
                if let Some(invoice) = self.selected_invoice() {
                    if invoice.balance() > 0.0 {
                        self.payment_input = Some(String::new());
                    } else {
                        self.status.info("This invoice is settled.");
                    }
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                if let Err(e) = self.refresh() {
                    if e.is_unauthorized() {
                        return Ok(Some(SelectedPage::Logout));
                    }
                }
            }
            KeyCode::Char('b') | KeyCode::Char('B') | KeyCode::Esc => {
                return Ok(Some(SelectedPage::None))
            }
            _ => {}
        }
        Ok(None)
    }

    fn tick(&mut self) {
        self.status.tick();
    }

    fn render(&self, frame: &mut Frame) {
        crate::components::fill_background(frame);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(2),
            ])
            .margin(1)
            .split(frame.area());

        render_header(frame, layout[0], "BILLING");

        let filter_label = match FILTERS[self.filter_index] {
            None => "All".to_string(),
            Some(status) => status.to_string(),
        };
        let outstanding: f64 = self
            .invoices
            .iter()
            .filter(|i| i.status != InvoiceStatus::Cancelled)
            .map(Invoice::balance)
            .sum();
        let summary = Paragraph::new(Line::from(vec![
            Span::styled(
                format!(" Filter: {filter_label} "),
                Style::default().fg(palette::BG).bg(palette::INFO),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Outstanding: ${outstanding:.2}"),
                Style::default().fg(palette::TEXT).add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(summary, layout[1]);

        let rows: Vec<Row> = self
            .filtered()
            .iter()
            .map(|i| {
                let style = match i.status {
                    InvoiceStatus::Overdue => Style::default().fg(palette::ERROR),
                    InvoiceStatus::Paid => Style::default().fg(palette::SUCCESS),
                    InvoiceStatus::Cancelled => Style::default().fg(palette::TEXT_DIM),
                    _ => Style::default().fg(palette::TEXT),
                };
                Row::new(vec![
                    format!("#{}", i.id),
                    i.patient_name.clone(),
                    i.issued_on.to_string(),
                    format!("${:.2}", i.amount),
                    format!("${:.2}", i.amount_paid),
                    format!("${:.2}", i.balance()),
                    i.status.to_string(),
                ])
                .style(style)
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Percentage(30),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(14),
            ],
        )
        .header(
            Row::new(vec!["Invoice", "Patient", "Issued", "Amount", "Paid", "Balance", "Status"])
                .style(Style::default().fg(palette::INFO).add_modifier(Modifier::BOLD)),
        )
        .row_highlight_style(
            Style::default()
                .fg(palette::FOCUS)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("\u{25ba} ")
        .block(
            Block::default()
                .title(" Invoices ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette::BORDER))
                .style(Style::default().bg(palette::PANEL)),
        );
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, layout[2], &mut state);

        if let Some(input) = &self.payment_input {
            self.render_payment_popup(frame, input);
        }

        self.status.render(frame, layout[3]);
        render_help(
            frame,
            layout[4],
            "\u{2191}\u{2193}: Select | P/Enter: Record Payment | S: Filter | R: Refresh | B: Back",
        );
    }
}

impl Billing {
    fn render_payment_popup(&self, frame: &mut Frame, input: &str) {
        let Some(invoice) = self.selected_invoice() else {
            return;
        };
        let area = crate::components::centered_rect(40, 20, frame.area());
        frame.render_widget(Clear, area);
        let text = vec![
            Line::from(Span::styled(
                format!("Invoice #{} \u{2014} balance ${:.2}", invoice.id, invoice.balance()),
                Style::default().fg(palette::TEXT),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Amount: $", Style::default().fg(palette::TEXT_DIM)),
                Span::styled(
                    format!("{input}\u{2588}"),
                    Style::default().fg(palette::FOCUS),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter: Record | Esc: Cancel",
                Style::default().fg(palette::TEXT_DIM),
            )),
        ];
        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(" Record Payment ")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(palette::FOCUS))
                    .style(Style::default().bg(palette::PANEL)),
            );
        frame.render_widget(popup, area);
    }
}
