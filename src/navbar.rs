//! Header menu with a flyout "Team" sub-menu

use crate::terminal::Terminal;
use crossterm::style::Color;

/// A client-side route: fixed path plus optional roster batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub batch: Option<&'static str>,
}

impl Route {
    pub const fn page(path: &'static str) -> Self {
        Self { path, batch: None }
    }

    pub const fn team(batch: &'static str) -> Self {
        Self { path: "/team", batch: Some(batch) }
    }

    /// Path with the query string, e.g. `/team?batch=2024-25`
    pub fn href(&self) -> String {
        match self.batch {
            Some(batch) => format!("{}?batch={}", self.path, urlencoding::encode(batch)),
            None => self.path.to_string(),
        }
    }
}

/// How the route change should happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Same page, only the query changes
    Push,
    /// Different page
    Transition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub kind: NavigationKind,
}

impl Navigation {
    /// Compare base paths (query ignored) to pick push vs transition
    pub fn to(route: Route, current_path: &str) -> Self {
        let kind = if route.path == current_path {
            NavigationKind::Push
        } else {
            NavigationKind::Transition
        };
        Self { route, kind }
    }
}

/// Whatever performs the route change
pub trait Navigator {
    fn navigate(&mut self, navigation: &Navigation);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

struct TopItem {
    label: &'static str,
    route: Option<Route>,
}

const TOP_ITEMS: &[TopItem] = &[
    TopItem { label: "Home", route: Some(Route::page("/")) },
    TopItem { label: "Team ▾", route: None },
    TopItem { label: "Achievements", route: Some(Route::page("/achievements")) },
    TopItem { label: "Gallery", route: Some(Route::page("/gallery")) },
    TopItem { label: "Alumni", route: Some(Route::page("/alumni")) },
    TopItem { label: "Contact", route: Some(Route::page("/contact")) },
];

const TEAM_ITEMS: &[(&str, Route)] = &[
    ("2024–25 Batch", Route::team("2024-25")),
    ("2025–26 Batch", Route::team("2025-26")),
];

const ITEM_GAP: u16 = 3;
const FLYOUT_WIDTH: u16 = 17;

/// Rectangle in terminal cells, half-open on the right/bottom edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl CellRect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.x && col < self.x + self.w && row >= self.y && row < self.y + self.h
    }
}

/// What a click on the bar resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Top(usize),
    Sub(usize),
}

/// Menu bar state plus its layout on row 0
pub struct Navbar {
    state: MenuState,
    current_path: &'static str,
    top_rects: Vec<CellRect>,
}

impl Navbar {
    pub fn new(current_path: &'static str) -> Self {
        let mut top_rects = Vec::with_capacity(TOP_ITEMS.len());
        let mut x = 2u16;
        for item in TOP_ITEMS {
            let w = item.label.chars().count() as u16;
            top_rects.push(CellRect { x, y: 0, w, h: 1 });
            x += w + ITEM_GAP;
        }
        Self {
            state: MenuState::Closed,
            current_path,
            top_rects,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    pub fn height(&self) -> u16 {
        1
    }

    fn trigger_rect(&self) -> CellRect {
        self.top_rects[1]
    }

    fn flyout_rect(&self) -> CellRect {
        let trigger = self.trigger_rect();
        CellRect {
            x: trigger.x,
            y: 1,
            w: FLYOUT_WIDTH,
            h: TEAM_ITEMS.len() as u16 + 2,
        }
    }

    /// The region that keeps the flyout open: trigger, plus flyout while open
    pub fn hover_region_contains(&self, col: u16, row: u16) -> bool {
        self.trigger_rect().contains(col, row)
            || (self.is_open() && self.flyout_rect().contains(col, row))
    }

    pub fn pointer_enter(&mut self) {
        self.state = MenuState::Open;
    }

    pub fn pointer_leave(&mut self) {
        self.state = MenuState::Closed;
    }

    /// Pointer moved: open or close depending on the hover region.
    /// Returns true if the state changed.
    pub fn pointer_moved(&mut self, col: u16, row: u16) -> bool {
        let inside = self.hover_region_contains(col, row);
        match (self.state, inside) {
            (MenuState::Closed, true) => {
                self.pointer_enter();
                true
            }
            (MenuState::Open, false) => {
                self.pointer_leave();
                true
            }
            _ => false,
        }
    }

    /// Keyboard toggle, for terminals without mouse reporting
    pub fn toggle(&mut self) {
        self.state = match self.state {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        };
    }

    /// Pick flyout entry `index`; closes the menu
    pub fn select_sub_item(&mut self, index: usize) -> Option<Navigation> {
        let (_, route) = TEAM_ITEMS.get(index)?;
        self.state = MenuState::Closed;
        Some(Navigation::to(route.clone(), self.current_path))
    }

    /// Mark the route that is now showing
    pub fn set_current_path(&mut self, path: &'static str) {
        self.current_path = path;
    }

    fn target_at(&self, col: u16, row: u16) -> Option<Target> {
        if self.is_open() {
            let fly = self.flyout_rect();
            if fly.contains(col, row) {
                let line = row.checked_sub(fly.y + 1)? as usize;
                return (line < TEAM_ITEMS.len()).then_some(Target::Sub(line));
            }
        }
        self.top_rects
            .iter()
            .position(|r| r.contains(col, row))
            .map(Target::Top)
    }

    /// Click at a cell; returns the navigation it triggers, if any
    pub fn click(&mut self, col: u16, row: u16) -> Option<Navigation> {
        match self.target_at(col, row)? {
            Target::Sub(i) => self.select_sub_item(i),
            Target::Top(i) => match &TOP_ITEMS[i].route {
                Some(route) => {
                    self.state = MenuState::Closed;
                    Some(Navigation::to(route.clone(), self.current_path))
                }
                None => {
                    self.toggle();
                    None
                }
            },
        }
    }

    /// Whether a pointer event at this cell belongs to the bar rather than the view
    pub fn captures(&self, col: u16, row: u16) -> bool {
        row < self.height() || (self.is_open() && self.flyout_rect().contains(col, row))
    }

    pub fn render(&self, term: &mut Terminal, width: u16, accent: Color) {
        for x in 0..width {
            term.set(x as i32, 0, ' ', None, false);
        }
        for (item, rect) in TOP_ITEMS.iter().zip(&self.top_rects) {
            let active = item.route.as_ref().map_or(self.current_path == "/team", |r| r.path == self.current_path);
            let trigger_open = item.route.is_none() && self.is_open();
            let color = if active || trigger_open { accent } else { Color::Grey };
            term.set_str(rect.x as i32, 0, item.label, Some(color), active);
        }

        if !self.is_open() {
            return;
        }

        let fly = self.flyout_rect();
        let (x0, y0) = (fly.x as i32, fly.y as i32);
        let (x1, y1) = (x0 + fly.w as i32 - 1, y0 + fly.h as i32 - 1);
        let border = Some(Color::DarkGrey);
        term.set(x0, y0, '╭', border, false);
        term.set(x1, y0, '╮', border, false);
        term.set(x0, y1, '╰', border, false);
        term.set(x1, y1, '╯', border, false);
        for x in x0 + 1..x1 {
            term.set(x, y0, '─', border, false);
            term.set(x, y1, '─', border, false);
        }
        for (i, (label, _)) in TEAM_ITEMS.iter().enumerate() {
            let y = y0 + 1 + i as i32;
            term.set(x0, y, '│', border, false);
            term.set(x1, y, '│', border, false);
            for x in x0 + 1..x1 {
                term.set(x, y, ' ', None, false);
            }
            term.set_str(x0 + 2, y, &format!("{} {}", i + 1, label), Some(Color::Grey), false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        assert_eq!(Navbar::new("/alumni").state(), MenuState::Closed);
    }

    #[test]
    fn hover_opens_and_leave_closes() {
        let mut nav = Navbar::new("/alumni");
        let trigger = nav.trigger_rect();
        assert!(nav.pointer_moved(trigger.x, 0));
        assert!(nav.is_open());
        // moving down into the flyout keeps it open
        assert!(!nav.pointer_moved(trigger.x + 1, 2));
        assert!(nav.is_open());
        assert!(nav.pointer_moved(0, 10));
        assert!(!nav.is_open());
    }

    #[test]
    fn flyout_does_not_open_menu_when_closed() {
        let mut nav = Navbar::new("/alumni");
        let trigger = nav.trigger_rect();
        assert!(!nav.pointer_moved(trigger.x + 1, 2));
        assert!(!nav.is_open());
    }

    #[test]
    fn selecting_batch_closes_and_navigates() {
        let mut nav = Navbar::new("/alumni");
        nav.pointer_enter();
        let navigation = nav.select_sub_item(0).unwrap();
        assert!(!nav.is_open());
        assert_eq!(navigation.route.href(), "/team?batch=2024-25");
        assert_eq!(navigation.kind, NavigationKind::Transition);
    }

    #[test]
    fn same_base_path_is_push() {
        let mut nav = Navbar::new("/team");
        let navigation = nav.select_sub_item(1).unwrap();
        assert_eq!(navigation.route.href(), "/team?batch=2025-26");
        assert_eq!(navigation.kind, NavigationKind::Push);
    }

    #[test]
    fn out_of_range_sub_item() {
        let mut nav = Navbar::new("/alumni");
        nav.pointer_enter();
        assert!(nav.select_sub_item(5).is_none());
        assert!(nav.is_open());
    }

    #[test]
    fn click_top_items() {
        let mut nav = Navbar::new("/alumni");
        let home = nav.top_rects[0];
        let navigation = nav.click(home.x, 0).unwrap();
        assert_eq!(navigation.route, Route::page("/"));

        let trigger = nav.trigger_rect();
        assert!(nav.click(trigger.x, 0).is_none());
        assert!(nav.is_open());

        let alumni = nav.top_rects[4];
        let navigation = nav.click(alumni.x, 0).unwrap();
        assert_eq!(navigation.kind, NavigationKind::Push);
        assert!(!nav.is_open());
    }

    #[test]
    fn click_flyout_entry() {
        let mut nav = Navbar::new("/alumni");
        nav.pointer_enter();
        let fly = nav.flyout_rect();
        let navigation = nav.click(fly.x + 2, fly.y + 2).unwrap();
        assert_eq!(navigation.route, Route::team("2025-26"));
        assert!(!nav.is_open());
        // the border row is not an entry
        nav.pointer_enter();
        assert!(nav.click(fly.x + 2, fly.y).is_none());
    }

    #[test]
    fn href_encodes_batch() {
        let route = Route { path: "/team", batch: Some("2024 25") };
        assert_eq!(route.href(), "/team?batch=2024%2025");
    }
}
