//! dexreader TUI - terminal manga reader for MangaDex
//!
//! Sidebar navigation between the home feed, search, manga details, the
//! reader and settings. Network calls run on background tasks and report
//! back to the UI loop over a channel.

use color_eyre::{eyre::Result, install};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dexreader::{
    prelude::*,
    tui::{
        StatusKind, Theme, format_chapter_title, format_description,
        format_manga_title, format_position, format_tags, quality_label, truncate_text,
    },
    types::ChapterQueryBuilder,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{fs, io, path::PathBuf, sync::Arc, sync::Mutex, time::Duration};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Results of background loads
#[derive(Debug)]
enum AppEvent {
    FeedLoaded(HomeFeed),
    SearchFinished {
        query: String,
        result: Result<Vec<Manga>, String>,
    },
    MangaLoaded(Manga),
    ChaptersLoaded {
        manga_id: String,
        request: LoadRequest,
        result: Result<PageSlice<Chapter>, String>,
    },
    ReaderMoved {
        reader: Box<ChapterReader>,
        result: Result<bool, String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AppMode {
    Home,
    Search,
    MangaDetails,
    Reader,
    Settings,
}

impl AppMode {
    fn all() -> [AppMode; 5] {
        [
            AppMode::Home,
            AppMode::Search,
            AppMode::MangaDetails,
            AppMode::Reader,
            AppMode::Settings,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            AppMode::Home => "Home",
            AppMode::Search => "Search",
            AppMode::MangaDetails => "Details",
            AppMode::Reader => "Reader",
            AppMode::Settings => "Settings",
        }
    }
}

// Which home list has focus
#[derive(Debug, Clone, Copy, PartialEq)]
enum HomeList {
    Popular,
    Updated,
}

// Reader step requested from the keyboard
#[derive(Debug, Clone, Copy)]
enum ChapterStep {
    Open(usize),
    Next,
    Previous,
}

struct App {
    mode: AppMode,
    show_help: bool,
    should_quit: bool,
    theme: Theme,

    // Home state
    feed: HomeFeed,
    feed_loading: bool,
    home_focus: HomeList,
    popular_state: ListState,
    updated_state: ListState,

    // Search state
    search_query: String,
    search_results: Vec<Manga>,
    search_list_state: ListState,
    search_input_active: bool,
    search_in_flight: Option<String>,

    // Manga details state
    selected_manga: Option<Manga>,
    chapter_query: Option<ChapterQuery>,
    chapters: Paginator<Chapter>,
    chapters_list_state: ListState,

    // Reader state; `None` while a chapter is being resolved
    reader: Option<ChapterReader>,
    reader_busy: bool,
    quality: ImageQuality,

    settings_selected: usize,

    status_message: String,
    status_kind: StatusKind,

    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,

    config: ClientConfig,
    api: Arc<dyn MangaApi>,
}

impl App {
    fn new(config: ClientConfig) -> Result<Self> {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let client = MangaDexClient::with_config(config.clone())?;

        Ok(Self {
            mode: AppMode::Home,
            show_help: false,
            should_quit: false,
            theme: Theme::default(),

            feed: HomeFeed::default(),
            feed_loading: false,
            home_focus: HomeList::Popular,
            popular_state: ListState::default(),
            updated_state: ListState::default(),

            search_query: String::new(),
            search_results: Vec::new(),
            search_list_state: ListState::default(),
            search_input_active: false,
            search_in_flight: None,

            selected_manga: None,
            chapter_query: None,
            chapters: Paginator::new(config.chapter_page_size),
            chapters_list_state: ListState::default(),

            reader: Some(ChapterReader::new(Vec::new(), ImageQuality::Data)),
            reader_busy: false,
            quality: ImageQuality::Data,

            settings_selected: 0,

            status_message: "Loading home feed...".to_string(),
            status_kind: StatusKind::Info,

            event_sender,
            event_receiver,

            config,
            api: Arc::new(client),
        })
    }

    fn set_status(&mut self, message: impl Into<String>, kind: StatusKind) {
        self.status_message = message.into();
        self.status_kind = kind;
    }

    fn switch_mode(&mut self, mode: AppMode) {
        self.mode = mode;
        self.search_input_active = false;
    }

    fn load_feed(&mut self) {
        if self.feed_loading {
            return;
        }
        self.feed_loading = true;
        self.set_status("Loading home feed...", StatusKind::Info);

        let api = Arc::clone(&self.api);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let feed = HomeFeed::load(api.as_ref()).await;
            let _ = sender.send(AppEvent::FeedLoaded(feed));
        });
    }

    fn perform_search(&mut self) {
        let query = self.search_query.trim().to_string();
        if query.is_empty() {
            self.search_results.clear();
            self.search_list_state.select(None);
            return;
        }
        self.set_status(format!("Searching for '{}'...", query), StatusKind::Info);
        self.search_in_flight = Some(query.clone());

        let api = Arc::clone(&self.api);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = api.search_manga(&query).await.map_err(|e| e.to_string());
            let _ = sender.send(AppEvent::SearchFinished { query, result });
        });
    }

    fn open_manga(&mut self, manga: Manga) {
        let query = ChapterQueryBuilder::default()
            .manga_id(manga.id.clone())
            .translated_languages(self.config.translated_languages.clone())
            .build();
        let query = match query {
            Ok(query) => query,
            Err(e) => {
                self.set_status(format!("Invalid chapter query: {}", e), StatusKind::Error);
                return;
            }
        };

        self.chapters.reset();
        self.chapters_list_state.select(None);
        self.chapter_query = Some(query);
        self.switch_mode(AppMode::MangaDetails);
        self.set_status(format!("Loading {}...", manga.title), StatusKind::Info);

        let api = Arc::clone(&self.api);
        let sender = self.event_sender.clone();
        let manga_id = manga.id.clone();
        tokio::spawn(async move {
            match api.manga(&manga_id).await {
                Ok(full) => {
                    let _ = sender.send(AppEvent::MangaLoaded(full));
                }
                Err(e) => tracing::warn!(manga = %manga_id, error = %e, "failed to load manga details"),
            }
        });

        self.selected_manga = Some(manga);
        self.load_more_chapters();
    }

    fn load_more_chapters(&mut self) {
        let Some(query) = self.chapter_query.clone() else {
            return;
        };
        let Some(request) = self.chapters.begin_request() else {
            return;
        };

        let api = Arc::clone(&self.api);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = api
                .chapter_page(&query, request.offset, request.limit)
                .await
                .map_err(|e| e.to_string());
            let _ = sender.send(AppEvent::ChaptersLoaded {
                manga_id: query.manga_id,
                request,
                result,
            });
        });
    }

    fn step_reader(&mut self, step: ChapterStep) {
        if self.reader_busy {
            return;
        }
        let Some(mut reader) = self.reader.take() else {
            return;
        };
        self.reader_busy = true;
        self.set_status("Loading pages...", StatusKind::Info);

        let api = Arc::clone(&self.api);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let result = match step {
                ChapterStep::Open(index) => reader.open(api.as_ref(), index).await.map(|_| true),
                ChapterStep::Next => reader.next_chapter(api.as_ref()).await,
                ChapterStep::Previous => reader.previous_chapter(api.as_ref()).await,
            };
            let _ = sender.send(AppEvent::ReaderMoved {
                reader: Box::new(reader),
                result: result.map_err(|e| e.to_string()),
            });
        });
    }

    fn open_reader_at(&mut self, index: usize) {
        if self.reader_busy {
            return;
        }
        self.reader = Some(ChapterReader::new(self.chapters.items().to_vec(), self.quality));
        self.switch_mode(AppMode::Reader);
        self.step_reader(ChapterStep::Open(index));
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FeedLoaded(feed) => {
                self.feed_loading = false;
                self.popular_state
                    .select((!feed.popular.is_empty()).then_some(0));
                self.updated_state
                    .select((!feed.updated.is_empty()).then_some(0));
                if feed.is_empty() {
                    self.set_status("Home feed is empty (see log for errors)", StatusKind::Warning);
                } else {
                    self.set_status(
                        format!(
                            "{} popular, {} updated today",
                            feed.popular.len(),
                            feed.updated.len()
                        ),
                        StatusKind::Success,
                    );
                }
                self.feed = feed;
            }
            AppEvent::SearchFinished { query, result } => {
                if self.search_in_flight.as_deref() != Some(query.as_str()) {
                    return;
                }
                self.search_in_flight = None;
                match result {
                    Ok(results) => {
                        self.search_list_state
                            .select((!results.is_empty()).then_some(0));
                        self.set_status(format!("Found {} results", results.len()), StatusKind::Success);
                        self.search_results = results;
                    }
                    Err(e) => {
                        tracing::warn!(query = %query, error = %e, "search failed");
                        self.search_results.clear();
                        self.search_list_state.select(None);
                        self.set_status(format!("Search failed: {}", e), StatusKind::Error);
                    }
                }
            }
            AppEvent::MangaLoaded(manga) => {
                if self.selected_manga.as_ref().is_some_and(|m| m.id == manga.id) {
                    self.selected_manga = Some(manga);
                }
            }
            AppEvent::ChaptersLoaded {
                manga_id,
                request,
                result,
            } => {
                let current = self.chapter_query.as_ref().map(|q| q.manga_id.as_str());
                if current != Some(manga_id.as_str()) || !self.chapters.is_pending(&request) {
                    tracing::debug!(manga = %manga_id, offset = request.offset, "ignoring stale chapter page");
                    return;
                }
                match result {
                    Ok(slice) => {
                        let added = self.chapters.apply_for(&request, slice).unwrap_or(0);
                        if self.chapters_list_state.selected().is_none() && !self.chapters.is_empty() {
                            self.chapters_list_state.select(Some(0));
                        }
                        if let Some(reader) = self.reader.as_mut() {
                            if reader.current_chapter().and_then(|c| c.manga_id.as_deref())
                                == Some(manga_id.as_str())
                            {
                                reader.set_chapters(self.chapters.items().to_vec());
                            }
                        }
                        let more = if self.chapters.has_more() { ", more available" } else { "" };
                        self.set_status(
                            format!("{} chapters (+{}){}", self.chapters.len(), added, more),
                            StatusKind::Success,
                        );
                    }
                    Err(e) => {
                        self.chapters.fail_for(&request);
                        tracing::warn!(manga = %manga_id, error = %e, "chapter page failed");
                        self.set_status(format!("Failed to load chapters: {}", e), StatusKind::Error);
                    }
                }
            }
            AppEvent::ReaderMoved { mut reader, result } => {
                self.reader_busy = false;
                // Settings may have changed while the reader was away
                reader.set_quality(self.quality);
                match result {
                    Ok(true) => {
                        let title = reader
                            .current_chapter()
                            .map(|c| c.display_title())
                            .unwrap_or_default();
                        self.set_status(format!("{} ({})", title, format_position(&reader)), StatusKind::Success);
                    }
                    Ok(false) => self.set_status("No more chapters in that direction", StatusKind::Warning),
                    Err(e) => self.set_status(format!("Failed to open chapter: {}", e), StatusKind::Error),
                }
                self.reader = Some(*reader);
            }
        }
    }
}

// Key handling
impl App {
    fn handle_key_event(&mut self, key: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        if self.search_input_active {
            self.handle_search_input(key);
            return;
        }

        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::F(1) | KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab => {
                let modes = AppMode::all();
                let index = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
                self.switch_mode(modes[(index + 1) % modes.len()]);
            }
            KeyCode::BackTab => {
                let modes = AppMode::all();
                let index = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
                self.switch_mode(modes[(index + modes.len() - 1) % modes.len()]);
            }
            _ => match self.mode {
                AppMode::Home => self.handle_home_keys(key),
                AppMode::Search => self.handle_search_keys(key),
                AppMode::MangaDetails => self.handle_manga_keys(key),
                AppMode::Reader => self.handle_reader_keys(key),
                AppMode::Settings => self.handle_settings_keys(key),
            },
        }
    }

    fn handle_home_keys(&mut self, key: KeyCode) {
        let (list, state) = match self.home_focus {
            HomeList::Popular => (&self.feed.popular, &mut self.popular_state),
            HomeList::Updated => (&self.feed.updated, &mut self.updated_state),
        };

        match key {
            KeyCode::Left | KeyCode::Right => {
                self.home_focus = match self.home_focus {
                    HomeList::Popular => HomeList::Updated,
                    HomeList::Updated => HomeList::Popular,
                };
            }
            KeyCode::Up => select_previous(state),
            KeyCode::Down => select_next(state, list.len()),
            KeyCode::Enter => {
                if let Some(manga) = state.selected().and_then(|i| list.get(i)).cloned() {
                    self.open_manga(manga);
                }
            }
            KeyCode::Char('r') => self.load_feed(),
            _ => {}
        }
    }

    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter => {
                self.search_input_active = false;
                self.perform_search();
            }
            KeyCode::Esc => self.search_input_active = false,
            KeyCode::Backspace => {
                self.search_query.pop();
            }
            KeyCode::Char(c) => self.search_query.push(c),
            _ => {}
        }
    }

    fn handle_search_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('s') | KeyCode::Char('/') => {
                self.search_input_active = true;
                self.set_status("Enter search query and press Enter", StatusKind::Info);
            }
            KeyCode::Up => select_previous(&mut self.search_list_state),
            KeyCode::Down => select_next(&mut self.search_list_state, self.search_results.len()),
            KeyCode::Enter => {
                if let Some(manga) = self
                    .search_list_state
                    .selected()
                    .and_then(|i| self.search_results.get(i))
                    .cloned()
                {
                    self.open_manga(manga);
                }
            }
            KeyCode::Esc => self.switch_mode(AppMode::Home),
            _ => {}
        }
    }

    fn handle_manga_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => select_previous(&mut self.chapters_list_state),
            KeyCode::Down => {
                let len = self.chapters.len();
                let at_end = self
                    .chapters_list_state
                    .selected()
                    .is_some_and(|i| i + 1 >= len);
                if at_end {
                    self.load_more_chapters();
                } else {
                    select_next(&mut self.chapters_list_state, len);
                }
            }
            KeyCode::Char('m') => self.load_more_chapters(),
            KeyCode::Enter => {
                if let Some(index) = self.chapters_list_state.selected() {
                    self.open_reader_at(index);
                }
            }
            KeyCode::Esc => self.switch_mode(AppMode::Search),
            _ => {}
        }
    }

    fn handle_reader_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') => self.step_reader(ChapterStep::Next),
            KeyCode::Char('p') => self.step_reader(ChapterStep::Previous),
            KeyCode::Esc => self.switch_mode(AppMode::MangaDetails),
            _ => {
                let Some(reader) = self.reader.as_mut() else {
                    return;
                };
                let moved = match key {
                    KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') => reader.next_page(),
                    KeyCode::Left | KeyCode::Up => reader.previous_page(),
                    KeyCode::Home => reader.go_to_page(0),
                    KeyCode::End => reader.go_to_page(reader.pages().len().saturating_sub(1)),
                    _ => return,
                };
                if !moved && reader.position().is_some() {
                    let hint = if reader.has_next_chapter() || reader.has_previous_chapter() {
                        "Chapter boundary; n/p to change chapter"
                    } else {
                        "Chapter boundary"
                    };
                    self.set_status(hint, StatusKind::Info);
                }
            }
        }
    }

    fn handle_settings_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.settings_selected = self.settings_selected.saturating_sub(1),
            KeyCode::Down => self.settings_selected = (self.settings_selected + 1).min(1),
            KeyCode::Enter | KeyCode::Char(' ') => match self.settings_selected {
                0 => {
                    self.theme = Theme::for_mode(self.theme.mode.toggled());
                    self.set_status(format!("{} theme", self.theme.mode.label()), StatusKind::Success);
                }
                _ => {
                    self.quality = self.quality.toggled();
                    if let Some(reader) = self.reader.as_mut() {
                        reader.set_quality(self.quality);
                    }
                    self.set_status(
                        format!("{} applies from the next chapter", quality_label(self.quality)),
                        StatusKind::Success,
                    );
                }
            },
            _ => {}
        }
    }
}

fn select_previous(state: &mut ListState) {
    if let Some(selected) = state.selected() {
        if selected > 0 {
            state.select(Some(selected - 1));
        }
    }
}

fn select_next(state: &mut ListState, len: usize) {
    if len > 0 {
        let selected = state.selected().map_or(0, |s| (s + 1).min(len - 1));
        state.select(Some(selected));
    }
}

// Rendering implementation
impl App {
    fn render(&mut self, f: &mut Frame) {
        let size = f.size();
        f.render_widget(Block::default().style(self.theme.base()), size);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(20), Constraint::Min(0)])
            .split(size);

        self.render_sidebar(f, chunks[0]);

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Status bar
            ])
            .split(chunks[1]);

        self.render_header(f, main_chunks[0]);
        match self.mode {
            AppMode::Home => self.render_home(f, main_chunks[1]),
            AppMode::Search => self.render_search(f, main_chunks[1]),
            AppMode::MangaDetails => self.render_manga_details(f, main_chunks[1]),
            AppMode::Reader => self.render_reader(f, main_chunks[1]),
            AppMode::Settings => self.render_settings(f, main_chunks[1]),
        }
        self.render_status_bar(f, main_chunks[2]);

        if self.show_help {
            self.render_help_modal(f);
        }
    }

    fn block(&self, title: impl Into<String>) -> Block<'static> {
        Block::default()
            .title(title.into())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
    }

    fn render_sidebar(&self, f: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = AppMode::all()
            .iter()
            .map(|mode| {
                let style = if *mode == self.mode {
                    Style::default()
                        .fg(self.theme.primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.text_secondary)
                };
                ListItem::new(Line::from(mode.label())).style(style)
            })
            .collect();

        let sidebar = List::new(items).block(
            self.block("dexreader").title_style(
                Style::default()
                    .fg(self.theme.primary)
                    .add_modifier(Modifier::BOLD),
            ),
        );

        f.render_widget(sidebar, area);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let title = match self.mode {
            AppMode::Home => "Home",
            AppMode::Search => "Search Manga",
            AppMode::MangaDetails => "Manga Details",
            AppMode::Reader => "Reader",
            AppMode::Settings => "Settings",
        };

        let header = Paragraph::new(title)
            .style(
                Style::default()
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            )
            .block(self.block(""))
            .alignment(Alignment::Center);

        f.render_widget(header, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let status = Paragraph::new(self.status_message.as_str())
            .style(Style::default().fg(self.status_kind.color(&self.theme)))
            .block(self.block(""))
            .wrap(Wrap { trim: true });

        f.render_widget(status, area);
    }

    fn manga_items(&self, list: &[Manga], width: u16) -> Vec<ListItem<'static>> {
        list.iter()
            .map(|manga| {
                let mut title = format_manga_title(manga, &self.theme);
                if let Some(first) = title.spans.first_mut() {
                    first.content = truncate_text(&first.content, width as usize).into();
                }
                ListItem::new(title)
            })
            .collect()
    }

    fn render_home(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .margin(1)
            .split(area);

        let lists = [
            (HomeList::Popular, "Popular", chunks[0]),
            (HomeList::Updated, "Updated Today", chunks[1]),
        ];
        for (which, title, rect) in lists {
            let items = match which {
                HomeList::Popular => &self.feed.popular,
                HomeList::Updated => &self.feed.updated,
            };
            let border = if self.home_focus == which {
                self.theme.border_focus
            } else {
                self.theme.border
            };
            let block = self
                .block(format!("{} ({})", title, items.len()))
                .border_style(Style::default().fg(border));

            if items.is_empty() {
                let text = if self.feed_loading { "Loading..." } else { "Nothing here. Press 'r' to reload." };
                let placeholder = Paragraph::new(text)
                    .style(Style::default().fg(self.theme.text_muted))
                    .block(block)
                    .alignment(Alignment::Center);
                f.render_widget(placeholder, rect);
                continue;
            }

            let list = List::new(self.manga_items(items, rect.width.saturating_sub(4)))
                .block(block)
                .highlight_style(self.theme.highlight());
            let state = match which {
                HomeList::Popular => &mut self.popular_state,
                HomeList::Updated => &mut self.updated_state,
            };
            f.render_stateful_widget(list, rect, state);
        }
    }

    fn render_search(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search input
                Constraint::Min(0),    // Results
            ])
            .margin(1)
            .split(area);

        let (input_color, border_color) = if self.search_input_active {
            (self.theme.primary, self.theme.border_focus)
        } else {
            (self.theme.text_secondary, self.theme.border)
        };
        let search_input = Paragraph::new(self.search_query.as_str())
            .style(Style::default().fg(input_color))
            .block(
                self.block("Search Query (press 's' or '/' to edit)")
                    .border_style(Style::default().fg(border_color)),
            );
        f.render_widget(search_input, chunks[0]);

        if self.search_results.is_empty() {
            let text = if self.search_in_flight.is_some() {
                "Searching..."
            } else {
                "No results. Press 's' or '/' to search."
            };
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(self.theme.text_muted))
                .block(self.block("Results"))
                .alignment(Alignment::Center);
            f.render_widget(placeholder, chunks[1]);
            return;
        }

        let items = self.manga_items(&self.search_results, chunks[1].width.saturating_sub(4));
        let results_list = List::new(items)
            .block(self.block(format!("Results ({})", self.search_results.len())))
            .highlight_style(self.theme.highlight());

        f.render_stateful_widget(results_list, chunks[1], &mut self.search_list_state);
    }

    fn render_manga_details(&mut self, f: &mut Frame, area: Rect) {
        let Some(manga) = self.selected_manga.clone() else {
            let placeholder = Paragraph::new("No manga selected. Pick one from Home or Search.")
                .style(Style::default().fg(self.theme.text_muted))
                .block(self.block("Manga Details"))
                .alignment(Alignment::Center);
            f.render_widget(
                placeholder,
                area.inner(&Margin {
                    horizontal: 1,
                    vertical: 1,
                }),
            );
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(10), // Manga info
                Constraint::Min(0),     // Chapters
            ])
            .margin(1)
            .split(area);

        let label = Style::default().fg(self.theme.accent);
        let mut info_text = vec![
            Line::from(vec![
                Span::styled("Title: ", label),
                Span::styled(manga.title.clone(), Style::default().fg(self.theme.text_primary)),
            ]),
            Line::from(vec![
                Span::styled("Authors: ", label),
                Span::styled(
                    if manga.authors.is_empty() {
                        "Unknown".to_string()
                    } else {
                        manga.authors.join(", ")
                    },
                    Style::default().fg(self.theme.text_secondary),
                ),
            ]),
            Line::from(vec![
                Span::styled("Status: ", label),
                Span::styled(
                    manga.status.clone().unwrap_or_else(|| "unknown".to_string()),
                    Style::default().fg(self.theme.info),
                ),
            ]),
            Line::from(vec![Span::styled("Tags: ", label)]),
            format_tags(&manga.tags, &self.theme),
            Line::from(""),
        ];
        info_text.extend(format_description(
            manga.description.as_deref(),
            chunks[0].width.saturating_sub(4) as usize,
            &self.theme,
        ));

        let manga_info = Paragraph::new(info_text)
            .block(self.block("Manga Information"))
            .wrap(Wrap { trim: true });
        f.render_widget(manga_info, chunks[0]);

        if self.chapters.is_empty() {
            let text = if self.chapters.is_loading() {
                "Loading chapters..."
            } else {
                "No English chapters available"
            };
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(self.theme.text_muted))
                .block(self.block("Chapters"))
                .alignment(Alignment::Center);
            f.render_widget(placeholder, chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .chapters
            .items()
            .iter()
            .map(|chapter| ListItem::new(format_chapter_title(chapter, &self.theme)))
            .collect();

        let more = if self.chapters.is_loading() {
            " - loading more"
        } else if self.chapters.has_more() {
            " - 'm' for more"
        } else {
            ""
        };
        let chapters_list = List::new(items)
            .block(self.block(format!(
                "Chapters ({}){} - Enter to read",
                self.chapters.len(),
                more
            )))
            .highlight_style(self.theme.highlight());

        f.render_stateful_widget(chapters_list, chunks[1], &mut self.chapters_list_state);
    }

    fn render_reader(&self, f: &mut Frame, area: Rect) {
        let area = area.inner(&Margin {
            horizontal: 1,
            vertical: 1,
        });

        let Some(reader) = self.reader.as_ref().filter(|r| r.current_chapter().is_some()) else {
            let text = if self.reader_busy {
                "Resolving pages..."
            } else {
                "No chapter open. Pick one from Details."
            };
            let placeholder = Paragraph::new(text)
                .style(Style::default().fg(self.theme.text_muted))
                .block(self.block("Reader"))
                .alignment(Alignment::Center);
            f.render_widget(placeholder, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(area);

        let label = Style::default().fg(self.theme.accent);
        let title = reader
            .current_chapter()
            .map(|c| c.display_title())
            .unwrap_or_default();
        let quality = reader
            .page_list()
            .map(|p| quality_label(p.quality))
            .unwrap_or_else(|| quality_label(reader.quality()));
        let header = Paragraph::new(vec![
            Line::from(vec![
                Span::styled("Chapter: ", label),
                Span::styled(title, Style::default().fg(self.theme.text_primary)),
            ]),
            Line::from(vec![
                Span::styled("Position: ", label),
                Span::styled(format_position(reader), Style::default().fg(self.theme.text_secondary)),
                Span::styled(format!("  [{}]", quality), Style::default().fg(self.theme.text_muted)),
            ]),
            Line::from(vec![
                Span::styled("Image: ", label),
                Span::styled(
                    reader.current_page_url().unwrap_or("-").to_string(),
                    Style::default().fg(self.theme.info),
                ),
            ]),
        ])
        .block(self.block(if self.reader_busy { "Loading..." } else { "Now Reading" }));
        f.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = reader
            .pages()
            .iter()
            .enumerate()
            .map(|(i, url)| {
                ListItem::new(Line::from(format!(
                    "{:>3}  {}",
                    i + 1,
                    truncate_text(url, chunks[1].width.saturating_sub(10) as usize)
                )))
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(reader.page()));

        let pages = List::new(items)
            .block(self.block("Pages - arrows to turn, n/p to change chapter"))
            .highlight_style(self.theme.highlight());
        f.render_stateful_widget(pages, chunks[1], &mut state);
    }

    fn render_settings(&self, f: &mut Frame, area: Rect) {
        let area = area.inner(&Margin {
            horizontal: 1,
            vertical: 1,
        });

        let rows = [
            format!("Theme: {}", self.theme.mode.label()),
            format!("Page images: {}", quality_label(self.quality)),
        ];
        let items: Vec<ListItem> = rows
            .into_iter()
            .map(|row| ListItem::new(Line::from(row)))
            .collect();

        let mut state = ListState::default();
        state.select(Some(self.settings_selected));
        let list = List::new(items)
            .block(self.block("Settings - Enter to toggle"))
            .highlight_style(self.theme.highlight());
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_help_modal(&self, f: &mut Frame) {
        let area = centered_rect(60, 70, f.size());
        f.render_widget(Clear, area);

        let help_text = vec![
            Line::from("dexreader - Quick Help"),
            Line::from(""),
            Line::from("Navigation:"),
            Line::from("  Tab       - Next section"),
            Line::from("  ↑↓        - Navigate items"),
            Line::from("  Enter     - Select/Activate"),
            Line::from("  Esc       - Go back"),
            Line::from("  q         - Quit application"),
            Line::from(""),
            Line::from("Home:     ←→ switch list, r reload"),
            Line::from("Search:   s or / to type, Enter to search"),
            Line::from("Details:  m or ↓ at the end loads more chapters"),
            Line::from("Reader:   ←→ turn pages, n/p next/previous chapter"),
            Line::from("Settings: theme and data saver"),
            Line::from(""),
            Line::from("Press any key to close"),
        ];

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(self.theme.text_primary).bg(self.theme.background))
            .block(
                Block::default()
                    .title("Help")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.info))
                    .border_type(BorderType::Rounded),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(help, area);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn load_config() -> Result<ClientConfig> {
    match std::env::var_os("DEXREADER_CONFIG") {
        Some(path) => Ok(ClientConfig::from_json_file(PathBuf::from(path))?),
        None => Ok(ClientConfig::default()),
    }
}

// Stdout belongs to the terminal UI, so logs go to a file in the cache dir
fn init_logging() -> Result<Option<PathBuf>> {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("dexreader")) else {
        return Ok(None);
    };
    fs::create_dir_all(&dir)?;
    let path = dir.join("dexreader.log");
    let file = fs::File::create(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dexreader=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(Some(path))
}

#[tokio::main]
async fn main() -> Result<()> {
    install()?;

    let log_path = init_logging()?;
    let config = load_config()?;
    tracing::info!(api = %config.api_base, log = ?log_path, "starting dexreader");

    let mut app = App::new(config)?;
    app.load_feed();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| app.render(f))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key_event(key.code);
                }
            }
        }

        while let Ok(app_event) = app.event_receiver.try_recv() {
            app.handle_app_event(app_event);
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
