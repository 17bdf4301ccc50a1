//! Interactive shell: navbar on top, the active view, a status line below

use crate::config::{GlobeConfig, MapConfig};
use crate::geo::{in_batch, PersonRecord};
use crate::help::{render_help_overlay, GLOBAL_HELP};
use crate::navbar::{Navbar, Navigation, NavigationKind, Navigator};
use crate::resolver::LocationResolver;
use crate::terminal::{Input, Terminal};
use crate::viz::globe::GlobeView;
use crate::viz::map::MapView;
use crate::viz::{AlumniView, Area};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crossterm::style::Color;
use std::io;
use std::time::{Duration, Instant};

const FRAME_TIME: f32 = 0.03;
const MESSAGE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Globe,
    Map,
}

impl ViewKind {
    fn other(self) -> Self {
        match self {
            Self::Globe => Self::Map,
            Self::Map => Self::Globe,
        }
    }
}

pub struct App {
    people: Vec<PersonRecord>,
    resolver: LocationResolver,
    globe_config: GlobeConfig,
    map_config: MapConfig,
    kind: ViewKind,
    /// Batch picked from the team menu; `None` shows everyone
    batch: Option<&'static str>,
    view: Box<dyn AlumniView>,
    navbar: Navbar,
    message: Option<(String, Instant)>,
    show_help: bool,
    accent: Color,
}

impl App {
    pub fn new(
        people: Vec<PersonRecord>,
        resolver: LocationResolver,
        globe_config: GlobeConfig,
        map_config: MapConfig,
        kind: ViewKind,
    ) -> Self {
        let accent = map_config.accent;
        let view = build_view(kind, &people, &resolver, &globe_config, &map_config);
        Self {
            people,
            resolver,
            globe_config,
            map_config,
            kind,
            batch: None,
            view,
            navbar: Navbar::new("/alumni"),
            message: None,
            show_help: false,
            accent,
        }
    }

    #[cfg(test)]
    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    #[cfg(test)]
    pub fn navbar(&self) -> &Navbar {
        &self.navbar
    }

    /// Tear down the current view and build the other one
    pub fn switch_view(&mut self) {
        self.kind = self.kind.other();
        self.rebuild_view();
        tracing::info!(view = self.view.name(), points = self.view.points().len(), "switched view");
    }

    fn rebuild_view(&mut self) {
        let people = in_batch(&self.people, self.batch);
        self.view = build_view(self.kind, &people, &self.resolver, &self.globe_config, &self.map_config);
    }

    fn view_area(&self, width: u16, height: u16) -> Area {
        let top = self.navbar.height();
        Area { top, cols: width, rows: height.saturating_sub(top + 1) }
    }

    /// Handle a key; returns true when the app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        if self.show_help {
            match code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('?') | KeyCode::Esc => self.show_help = false,
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('v') => self.switch_view(),
            KeyCode::Char('t') => self.navbar.toggle(),
            KeyCode::Esc if self.navbar.is_open() => self.navbar.pointer_leave(),
            KeyCode::Char(c @ '1'..='9') if self.navbar.is_open() => {
                let index = c as usize - '1' as usize;
                if let Some(navigation) = self.navbar.select_sub_item(index) {
                    self.navigate(&navigation);
                }
            }
            _ => {
                self.view.handle_key(code, modifiers);
            }
        }
        false
    }

    pub fn handle_mouse(&mut self, event: &MouseEvent, width: u16, height: u16) {
        let area = self.view_area(width, height);
        let (col, row) = (event.column, event.row);

        if event.kind == MouseEventKind::Moved {
            self.navbar.pointer_moved(col, row);
        }

        let captured = self.navbar.captures(col, row) && !matches!(event.kind, MouseEventKind::Up(_));
        if !captured {
            self.view.handle_mouse(event, area);
            return;
        }

        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(navigation) = self.navbar.click(col, row) {
                    self.navigate(&navigation);
                }
            }
            // pointer left the view for the bar: let the view drop its hover
            MouseEventKind::Moved => {
                let outside = MouseEvent { row: 0, column: 0, ..*event };
                self.view.handle_mouse(&outside, area);
            }
            _ => {}
        }
    }

    fn status_text(&self) -> String {
        match &self.message {
            Some((text, at)) if at.elapsed() < MESSAGE_TTL => text.clone(),
            _ => self.view.status(),
        }
    }

    pub fn draw(&mut self, term: &mut Terminal) {
        let (width, height) = term.size();
        term.clear();

        let area = self.view_area(width, height);
        if area.rows > 0 {
            self.view.render(term, area);
        }

        if height > 0 {
            let status_row = height as i32 - 1;
            let hint = format!("[{}] v switch · ? help", self.view.name());
            let hint_x = width as i32 - hint.chars().count() as i32 - 1;
            let room = (hint_x - 2).max(0) as usize;
            let text: String = self.status_text().chars().take(room).collect();
            term.set_str(1, status_row, &text, Some(Color::Grey), false);
            term.set_str(hint_x, status_row, &hint, Some(Color::DarkGrey), false);
        }

        self.navbar.render(term, width, self.accent);

        if self.show_help {
            let text = format!("{}\n\n{}", self.view.help(), GLOBAL_HELP);
            render_help_overlay(term, width, height, &text);
        }
    }

    pub fn run(mut self) -> io::Result<()> {
        let mut term = Terminal::new()?;
        tracing::info!(view = self.view.name(), people = self.people.len(), "interactive session started");

        loop {
            while let Some(input) = term.poll_input()? {
                match input {
                    Input::Key(code, modifiers) => {
                        if self.handle_key(code, modifiers) {
                            return Ok(());
                        }
                    }
                    Input::Mouse(event) => {
                        let (width, height) = term.size();
                        self.handle_mouse(&event, width, height);
                    }
                    Input::Resize(width, height) => {
                        term.resize(width, height);
                        term.clear_screen()?;
                    }
                }
            }

            self.view.poll_assets();
            self.draw(&mut term);
            term.present()?;
            term.sleep(FRAME_TIME);
        }
    }
}

impl Navigator for App {
    fn navigate(&mut self, navigation: &Navigation) {
        let href = navigation.route.href();
        let kind = match navigation.kind {
            NavigationKind::Push => "push",
            NavigationKind::Transition => "transition",
        };
        self.navbar.set_current_path(navigation.route.path);
        if navigation.route.batch != self.batch {
            self.batch = navigation.route.batch;
            self.rebuild_view();
        }
        tracing::info!(route = %href, kind, points = self.view.points().len(), "navigation requested");
        self.message = Some((format!("→ {href} ({kind})"), Instant::now()));
    }
}

fn build_view(
    kind: ViewKind,
    people: &[PersonRecord],
    resolver: &LocationResolver,
    globe_config: &GlobeConfig,
    map_config: &MapConfig,
) -> Box<dyn AlumniView> {
    match kind {
        ViewKind::Globe => Box::new(GlobeView::new(people, resolver, globe_config.clone())),
        ViewKind::Map => Box::new(MapView::new(people, resolver, map_config.clone())),
    }
}
