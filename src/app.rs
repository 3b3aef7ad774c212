use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::model::config::AppConfig;
use crate::model::prompt::{SelectList, TextInput};
use crate::model::request::{
    ScaffoldRequest, default_project_path, resolve_project_name, resolve_project_path,
};
use crate::model::stage::Stage;
use crate::msg::Msg;
use crate::plugin::Catalog;
use crate::scaffold::{ScaffoldReport, Scaffolder};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct App {
    pub stage: Stage,
    catalog: Catalog,
    scaffolder: Scaffolder,
    default_project_name: String,
    project_name: String,
    project_path: PathBuf,
    name_input: TextInput,
    path_input: TextInput,
    inputs: SelectList,
    outputs: SelectList,
    selected_group: Option<usize>,
    report: Option<ScaffoldReport>,
    spinner_frame: usize,
    event_tx: mpsc::Sender<Msg>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        config: &AppConfig,
        plugins_dir: PathBuf,
        catalog: Catalog,
        name_override: Option<String>,
        event_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let scaffolder = Scaffolder::new(plugins_dir, config.binary_extensions());
        let default_project_name = config.general.default_project_name.clone();
        let inputs = SelectList::new(
            catalog
                .groups()
                .iter()
                .map(|group| group.label.clone())
                .collect(),
        );

        let mut app = Self {
            stage: Stage::NamingProject,
            catalog,
            scaffolder,
            name_input: TextInput::with_placeholder(default_project_name.clone()),
            path_input: TextInput::default(),
            default_project_name,
            project_name: String::new(),
            project_path: PathBuf::new(),
            inputs,
            outputs: SelectList::default(),
            selected_group: None,
            report: None,
            spinner_frame: 0,
            event_tx,
            should_quit: false,
        };

        if let Some(name) = name_override {
            app.submit_project_name(&name);
        }

        app
    }

    pub fn report(&self) -> Option<&ScaffoldReport> {
        self.report.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        match &self.stage {
            Stage::Failed(message) => Some(message),
            _ => None,
        }
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::ScaffoldFinished(result) => self.finish_scaffold(result),
            Msg::Tick => {
                if self.stage == Stage::Scaffolding {
                    self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
                }
            }
            Msg::Resize => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // No abort path once files are being written.
        if self.stage == Stage::Scaffolding {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.stage {
            Stage::NamingProject => self.handle_key_name(key),
            Stage::PathingProject => self.handle_key_path(key),
            Stage::SelectingInput => self.handle_key_input_format(key),
            Stage::SelectingOutput => self.handle_key_output_format(key),
            Stage::Done | Stage::Failed(_) => self.should_quit = true,
            Stage::Scaffolding => {}
        }
    }

    fn handle_key_name(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(ch) => self.name_input.push(ch),
            KeyCode::Backspace => self.name_input.pop(),
            KeyCode::Enter => {
                let raw = self.name_input.take();
                self.submit_project_name(&raw);
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_key_path(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(ch) => self.path_input.push(ch),
            KeyCode::Backspace => self.path_input.pop(),
            KeyCode::Enter => {
                let raw = self.path_input.take();
                self.project_path = resolve_project_path(&raw, &self.project_name);
                tracing::info!("project path: {}", self.project_path.display());
                self.stage = Stage::SelectingInput;
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_key_input_format(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.inputs.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.inputs.move_selection(-1),
            KeyCode::Enter => self.select_input_format(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_key_output_format(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.outputs.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.outputs.move_selection(-1),
            KeyCode::Enter => self.start_scaffold(),
            KeyCode::Esc => {
                self.selected_group = None;
                self.stage = Stage::SelectingInput;
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_project_name(&mut self, raw: &str) {
        self.project_name = resolve_project_name(raw, &self.default_project_name);
        self.path_input = TextInput::with_placeholder(
            default_project_path(&self.project_name)
                .to_string_lossy()
                .into_owned(),
        );
        tracing::info!("project name: {}", self.project_name);
        self.stage = Stage::PathingProject;
    }

    fn select_input_format(&mut self) {
        let Some(index) = self.inputs.selected_index() else {
            return;
        };
        let Some(group) = self.catalog.group(index) else {
            return;
        };

        self.outputs = SelectList::new(
            group
                .children
                .iter()
                .map(|plugin| plugin.display_name.clone())
                .collect(),
        );
        tracing::info!("input format: {}", group.value);
        self.selected_group = Some(index);
        self.stage = Stage::SelectingOutput;
    }

    fn start_scaffold(&mut self) {
        let plugin = self
            .selected_group
            .and_then(|group| self.catalog.group(group))
            .zip(self.outputs.selected_index())
            .and_then(|(group, index)| group.children.get(index));
        let Some(plugin) = plugin else {
            return;
        };

        tracing::debug!("selected plugin from {}", plugin.source.display());
        let request = ScaffoldRequest::new(
            self.project_name.clone(),
            self.project_path.clone(),
            plugin.clone(),
        );
        self.stage = Stage::Scaffolding;
        spawn_scaffold(self.scaffolder.clone(), request, self.event_tx.clone());
    }

    fn finish_scaffold(&mut self, result: Result<ScaffoldReport, String>) {
        match result {
            Ok(report) => {
                self.report = Some(report);
                self.stage = Stage::Done;
            }
            Err(err) => self.stage = Stage::Failed(err),
        }
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // banner
                Constraint::Min(1),    // body
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_banner(frame, chunks[0]);
        self.render_body(frame, chunks[1]);
        self.render_status_bar(frame, chunks[2]);
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect) {
        let banner = Paragraph::new(vec![
            Line::from(Span::styled(
                "S E R V A N T E",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Servante is a presentation scaffolding tool. Use \"servante --help\" for instructions.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(banner, area);
    }

    fn render_body(&self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        let label = Style::default().fg(Color::Gray);
        let chosen = Style::default().fg(Color::Green);

        if self.stage == Stage::NamingProject {
            lines.push(input_line("Project Name:", &self.name_input));
        } else {
            lines.push(Line::from(vec![
                Span::styled("Project Name: ", label),
                Span::styled(self.project_name.clone(), chosen),
            ]));
        }

        match self.stage {
            Stage::NamingProject => {}
            Stage::PathingProject => lines.push(input_line("Project Path:", &self.path_input)),
            _ => lines.push(Line::from(vec![
                Span::styled("Project Path: ", label),
                Span::styled(self.project_path.display().to_string(), chosen),
            ])),
        }

        lines.push(Line::default());

        match &self.stage {
            Stage::SelectingInput => {
                lines.push(Line::from("Select an Input format:"));
                lines.extend(list_lines(&self.inputs));
            }
            Stage::SelectingOutput => {
                if let Some(group) = self.selected_group.and_then(|i| self.catalog.group(i)) {
                    lines.push(Line::from(vec![
                        Span::styled("Input format: ", label),
                        Span::styled(group.label.clone(), chosen),
                    ]));
                }
                lines.push(Line::from("Select an Output format:"));
                lines.extend(list_lines(&self.outputs));

                let description = self
                    .selected_group
                    .and_then(|i| self.catalog.group(i))
                    .and_then(|group| group.children.get(self.outputs.selected))
                    .and_then(|plugin| plugin.description());
                if let Some(description) = description {
                    lines.push(Line::default());
                    lines.push(Line::from(Span::styled(description.to_string(), label)));
                }
            }
            Stage::Scaffolding => {
                let spinner = SPINNER_FRAMES[self.spinner_frame].repeat(3);
                lines.push(Line::from(vec![
                    Span::styled(format!("{spinner}  "), chosen),
                    Span::raw("Scaffolding Project"),
                    Span::styled(format!("  {spinner}"), chosen),
                ]));
            }
            Stage::Done => {
                lines.push(Line::from("All done. :)"));
                if let Some(report) = &self.report {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "{} ({} rendered, {} copied)",
                            report.destination.display(),
                            report.rendered,
                            report.copied
                        ),
                        label,
                    )));
                }
                lines.push(Line::from(Span::styled("press any key to exit", label)));
            }
            Stage::Failed(err) => {
                lines.push(Line::from(Span::styled(
                    format!("Scaffolding failed: {err}"),
                    Style::default().fg(Color::Red),
                )));
                lines.push(Line::from(Span::styled("press any key to exit", label)));
            }
            Stage::NamingProject | Stage::PathingProject => {}
        }

        let body = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(body, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let stage_style = match self.stage {
            Stage::Done => Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
            Stage::Failed(_) => Style::default()
                .fg(Color::Black)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            _ => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        };

        let hint = match self.stage {
            Stage::NamingProject | Stage::PathingProject => "Enter: confirm  Esc: quit",
            Stage::SelectingInput => "Enter: select  j/k: move  q: quit",
            Stage::SelectingOutput => "Enter: scaffold  j/k: move  Esc: back",
            Stage::Scaffolding => "writing files...",
            Stage::Done | Stage::Failed(_) => "any key: exit",
        };

        let bar = Line::from(vec![
            Span::styled(format!(" {} ", self.stage.label()), stage_style),
            Span::styled(
                format!(" {} plugins | {hint} ", self.catalog.plugin_count()),
                Style::default().fg(Color::Gray).bg(Color::DarkGray),
            ),
        ]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }
}

fn input_line<'a>(label: &'a str, input: &TextInput) -> Line<'a> {
    let value = if input.value.is_empty() {
        Span::styled(input.placeholder.clone(), Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(input.value.clone())
    };

    Line::from(vec![
        Span::raw(format!("{label} ")),
        value,
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])
}

fn list_lines(list: &SelectList) -> Vec<Line<'static>> {
    list.items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            if idx == list.selected {
                Line::from(Span::styled(
                    format!("> {item}"),
                    Style::default().fg(Color::Black).bg(Color::Cyan),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {item}"),
                    Style::default().fg(Color::Gray),
                ))
            }
        })
        .collect()
}

/// Runs the scaffold on its own thread with a single-threaded tokio runtime,
/// then reports back through the event channel.
fn spawn_scaffold(scaffolder: Scaffolder, request: ScaffoldRequest, tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let result = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(anyhow::Error::from)
            .and_then(|runtime| {
                runtime
                    .block_on(scaffolder.run(&request))
                    .map_err(anyhow::Error::from)
            })
            .map_err(|err| format!("{err:#}"));

        if tx.send(Msg::ScaffoldFinished(result)).is_err() {
            tracing::warn!("scaffold finished after the event loop closed");
        }
    });
}
