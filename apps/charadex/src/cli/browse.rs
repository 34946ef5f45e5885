//! # Browse Session
//!
//! Line-driven interactive view over the catalog.
//!
//! Facet edits go to a draft in the filter panel and only reach the list on
//! `apply`. Search text bypasses the panel and is applied after a debounce
//! delay, restarting on every new `search` line. The panel is laid out
//! against the terminal with the popover engine and recomputed whenever the
//! viewport changes.

use super::commands::Context;
use super::render;
use crate::catalog::Catalog;
use crate::error::AppError;
use charadex_core::{
    Align, CharacterId, CharadexError, FavoritesEvent, FavoritesStore, FilterPanel, FilterSelection,
    GenderFilter, Point, Popover, PopoverOptions, Rect, RelationFilter, Side, Size, SortOrder,
    SpeciesFilter, UrlState,
};
use std::io::{IsTerminal, Write};
use std::str::FromStr;
use std::sync::mpsc::Receiver;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

const DEFAULT_COLUMNS: i32 = 80;
const DEFAULT_LINES: i32 = 24;

const HELP: &str = "\
commands:
  search <text>        name prefix (applied after a short pause)
  relation <v>         all | starred | others   (draft)
  species <v>          all | human | alien      (draft)
  gender <v>           all | male | female | genderless | unknown   (draft)
  sort <v>             asc | desc               (draft)
  apply | cancel       commit or drop the draft
  panel                show or hide the filter panel
  page <n>             jump to a page
  open <name> | close  detail view by exact name
  star <id>            star or unstar
  comment <id> [text]  save a comment (no text deletes it)
  link                 print the shareable query string
  resize <cols> <rows> the terminal changed size
  help | quit";

// =============================================================================
// COMMANDS
// =============================================================================

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Relation(RelationFilter),
    Species(SpeciesFilter),
    Gender(GenderFilter),
    Sort(SortOrder),
    Apply,
    Cancel,
    Panel,
    Page(u32),
    Open(String),
    Close,
    Star(CharacterId),
    Comment(CharacterId, String),
    Link,
    Resize(i32, i32),
    Help,
    Quit,
}

fn invalid(line: &str) -> CharadexError {
    CharadexError::InvalidParam {
        key: "command".to_string(),
        value: line.to_string(),
    }
}

impl FromStr for BrowseCommand {
    type Err = CharadexError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let number = |raw: &str| raw.parse::<i32>().map_err(|_| invalid(line));

        let command = match word.to_ascii_lowercase().as_str() {
            "search" => Self::Search(rest.to_string()),
            "relation" => Self::Relation(rest.parse()?),
            "species" => Self::Species(rest.parse()?),
            "gender" => Self::Gender(rest.parse()?),
            "sort" => Self::Sort(rest.parse()?),
            "apply" => Self::Apply,
            "cancel" => Self::Cancel,
            "panel" | "filters" => Self::Panel,
            "page" => Self::Page(rest.parse().map_err(|_| invalid(line))?),
            "open" if !rest.is_empty() => Self::Open(rest.to_string()),
            "close" => Self::Close,
            "star" => Self::Star(rest.parse()?),
            "comment" => {
                let (id, text) = rest.split_once(' ').unwrap_or((rest, ""));
                Self::Comment(id.parse()?, text.to_string())
            }
            "link" => Self::Link,
            "resize" => {
                let (cols, rows) = rest.split_once(' ').ok_or_else(|| invalid(line))?;
                Self::Resize(number(cols)?, number(rows.trim())?)
            }
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(invalid(line)),
        };
        Ok(command)
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Terminal size from `COLUMNS` / `LINES`, falling back to 80x24.
pub fn terminal_viewport<F>(lookup: F) -> Rect
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str, default: i32| {
        lookup(key)
            .and_then(|v| v.trim().parse::<i32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
    };
    Rect::new(0, 0, read("COLUMNS", DEFAULT_COLUMNS), read("LINES", DEFAULT_LINES))
}

/// The "[filters]" trigger sits at the top-right corner of the viewport,
/// one cell in from the edge.
fn trigger_for(viewport: Rect) -> Rect {
    let width = 9;
    Rect::new(viewport.right().saturating_sub(width + 1), viewport.y, width, 1)
}

fn popover_for(viewport: Rect, panel: Size) -> Popover {
    Popover::new(
        trigger_for(viewport),
        panel,
        PopoverOptions {
            side: Side::Bottom,
            align: Align::End,
            ..PopoverOptions::default()
        },
    )
}

/// View state of one browse session, free of I/O.
#[derive(Debug, Clone)]
pub struct Session {
    panel: FilterPanel,
    url: UrlState,
    popover: Popover,
    viewport: Rect,
}

impl Session {
    #[must_use]
    pub fn new(url: UrlState, viewport: Rect) -> Self {
        let panel = FilterPanel::new(url.filters());
        let lines = render::filter_panel(panel.applied());
        let popover = popover_for(viewport, render::block_size(&lines));
        Self {
            panel,
            url,
            popover,
            viewport,
        }
    }

    #[must_use]
    pub fn applied(&self) -> &FilterSelection {
        self.panel.applied()
    }

    #[must_use]
    pub fn url(&self) -> &UrlState {
        &self.url
    }

    #[must_use]
    pub fn panel_position(&self) -> Option<Point> {
        self.popover.position()
    }

    /// Lines of the filter panel: the draft while editing, else the applied set.
    #[must_use]
    pub fn panel_lines(&self) -> Vec<String> {
        render::filter_panel(self.panel.draft().unwrap_or(self.panel.applied()))
    }

    fn open_panel(&mut self) {
        self.panel.open();
        if !self.popover.is_open() {
            self.popover.open(self.viewport);
        }
        self.popover.set_panel_size(render::block_size(&self.panel_lines()));
    }

    fn close_panel(&mut self) {
        self.popover.close();
    }

    fn sync_filters(&mut self) {
        let applied = self.panel.applied().clone();
        self.url.set_filters(&applied);
        self.url.set_page(None);
    }

    /// Apply debounced search text. Returns `true` if the list must refresh.
    pub fn apply_search(&mut self, text: &str) -> bool {
        let search = text.trim().to_string();
        if self.panel.applied().search == search {
            return false;
        }
        let draft = self.panel.draft().cloned();
        let mut applied = self.panel.applied().clone();
        applied.search = search.clone();
        self.panel.reset_to(applied);
        if let Some(mut draft) = draft {
            draft.search = search;
            *self.panel.open() = draft;
        }
        self.sync_filters();
        true
    }

    /// Stage a facet edit in the draft, opening the panel as needed.
    pub fn edit(&mut self, command: &BrowseCommand) {
        match command {
            BrowseCommand::Relation(v) => self.panel.set_relation(*v),
            BrowseCommand::Species(v) => self.panel.set_species(*v),
            BrowseCommand::Gender(v) => self.panel.set_gender(*v),
            BrowseCommand::Sort(v) => self.panel.set_sort(*v),
            _ => return,
        }
        self.open_panel();
    }

    /// Commit the draft. Returns `true` if the list must refresh.
    pub fn apply(&mut self) -> bool {
        let changed = self.panel.commit();
        self.close_panel();
        if changed {
            self.sync_filters();
        }
        changed
    }

    pub fn cancel(&mut self) {
        self.panel.cancel();
        self.close_panel();
    }

    /// Show the panel, or hide it and drop the draft if it is showing.
    pub fn toggle_panel(&mut self) {
        if self.popover.is_open() {
            self.cancel();
        } else {
            self.open_panel();
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.url.set_page(Some(page));
    }

    pub fn select(&mut self, name: Option<&str>) {
        self.url.select(name);
    }

    pub fn resize(&mut self, viewport: Rect) -> Option<Point> {
        self.viewport = viewport;
        // The trigger is pinned to the top-right corner, so it moves too.
        let was_open = self.popover.is_open();
        self.popover = popover_for(viewport, render::block_size(&self.panel_lines()));
        was_open.then(|| self.popover.open(viewport))
    }
}

// =============================================================================
// I/O LOOP
// =============================================================================

fn print_panel(session: &Session) {
    let Some(origin) = session.panel_position() else {
        return;
    };
    let lines = session.panel_lines();
    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        // Save cursor, paint at the anchored position, restore.
        print!("\x1b7{}\x1b8", render::at_position(&lines, origin));
    } else {
        println!("filters @ {},{}", origin.x, origin.y);
        for line in &lines {
            println!("  {}", line);
        }
    }
    let _ = stdout.flush();
}

async fn print_list(catalog: &Catalog, session: &Session, favorites: &FavoritesStore) {
    match catalog
        .list(session.applied(), session.url().page(), favorites)
        .await
    {
        Ok(listing) => println!("{}", render::listing(&listing, favorites)),
        Err(e) => println!("{}", e),
    }
}

async fn print_detail(catalog: &Catalog, name: &str, favorites: &FavoritesStore) -> bool {
    match catalog.find_by_name(name).await {
        Ok(character) => {
            println!(
                "{}",
                render::character_detail(&character, favorites.comment(character.id))
            );
            true
        }
        Err(e) => {
            println!("{}", e);
            false
        }
    }
}

/// Star or unstar `id`, looking the record up only when it is not starred.
async fn toggle_star(
    catalog: &Catalog,
    favorites: &mut FavoritesStore,
    id: CharacterId,
) -> Result<bool, AppError> {
    let character = match favorites.get(id) {
        Some(c) => c.clone(),
        None => catalog.by_id(id).await?,
    };
    Ok(favorites.toggle(character)?)
}

fn drain_events(events: &Receiver<FavoritesEvent>) {
    while let Ok(event) = events.try_recv() {
        tracing::debug!(?event, "favorites changed");
        let text = match event {
            FavoritesEvent::Starred(id) => format!("* starred {}", id),
            FavoritesEvent::Unstarred(id) => format!("  unstarred {}", id),
            FavoritesEvent::CommentSaved(id) => format!("  comment saved for {}", id),
            FavoritesEvent::CommentDeleted(id) => format!("  comment deleted for {}", id),
        };
        println!("{}", text);
    }
}

fn prompt() {
    print!("charadex> ");
    let _ = std::io::stdout().flush();
}

/// Run the interactive session until `quit` or end of input.
pub async fn run(ctx: &Context, state: UrlState) -> Result<(), AppError> {
    let catalog = ctx.catalog()?;
    let mut favorites = ctx.favorites()?;
    let events = favorites.subscribe();
    let debounce = ctx.config.debounce();
    let mut session = Session::new(state, terminal_viewport(|k| std::env::var(k).ok()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<(String, Instant)> = None;

    tracing::info!(debounce_ms = debounce.as_millis() as u64, "browse session started");
    if !ctx.quiet {
        println!("Type 'help' for commands.");
    }
    print_list(&catalog, &session, &favorites).await;
    if let Some(name) = session.url().selected() {
        print_detail(&catalog, &name, &favorites).await;
    }
    prompt();

    loop {
        let deadline = pending.as_ref().map(|(_, at)| *at);
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.map_err(|e| AppError::Io(e.to_string()))? else {
                    break;
                };
                if line.trim().is_empty() {
                    prompt();
                    continue;
                }
                let command = match line.parse::<BrowseCommand>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        prompt();
                        continue;
                    }
                };
                match command {
                    BrowseCommand::Quit => break,
                    BrowseCommand::Search(text) => {
                        pending = Some((text, Instant::now() + debounce));
                    }
                    BrowseCommand::Relation(_)
                    | BrowseCommand::Species(_)
                    | BrowseCommand::Gender(_)
                    | BrowseCommand::Sort(_) => {
                        session.edit(&command);
                        print_panel(&session);
                    }
                    BrowseCommand::Apply => {
                        if session.apply() {
                            print_list(&catalog, &session, &favorites).await;
                        }
                    }
                    BrowseCommand::Cancel => session.cancel(),
                    BrowseCommand::Panel => {
                        session.toggle_panel();
                        print_panel(&session);
                    }
                    BrowseCommand::Page(page) => {
                        session.set_page(page);
                        print_list(&catalog, &session, &favorites).await;
                    }
                    BrowseCommand::Open(name) => {
                        if print_detail(&catalog, &name, &favorites).await {
                            session.select(Some(&name));
                        }
                    }
                    BrowseCommand::Close => session.select(None),
                    BrowseCommand::Star(id) => {
                        if let Err(e) = toggle_star(&catalog, &mut favorites, id).await {
                            println!("{}", e);
                        }
                    }
                    BrowseCommand::Comment(id, text) => {
                        if let Err(e) = favorites.set_comment(id, &text) {
                            println!("{}", e);
                        }
                    }
                    BrowseCommand::Link => {
                        let query = session.url().to_query_string();
                        println!("{}", if query.is_empty() { "(default view)" } else { &query });
                    }
                    BrowseCommand::Resize(cols, rows) => {
                        session.resize(Rect::new(0, 0, cols, rows));
                        print_panel(&session);
                    }
                    BrowseCommand::Help => println!("{}", HELP),
                }
                drain_events(&events);
                prompt();
            }
            () = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                if let Some((text, _)) = pending.take() {
                    if session.apply_search(&text) {
                        println!();
                        print_list(&catalog, &session, &favorites).await;
                        prompt();
                    }
                }
            }
        }
    }

    tracing::info!(query = %session.url().to_query_string(), "browse session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0, 0, 80, 24);

    #[test]
    fn parses_commands() {
        assert_eq!(
            "search  Rick ".parse::<BrowseCommand>().expect("parse"),
            BrowseCommand::Search("Rick".to_string())
        );
        assert_eq!(
            "species ALIEN".parse::<BrowseCommand>().expect("parse"),
            BrowseCommand::Species(SpeciesFilter::Alien)
        );
        assert_eq!(
            "comment 3 best grandpa".parse::<BrowseCommand>().expect("parse"),
            BrowseCommand::Comment(CharacterId(3), "best grandpa".to_string())
        );
        assert_eq!(
            "comment 3".parse::<BrowseCommand>().expect("parse"),
            BrowseCommand::Comment(CharacterId(3), String::new())
        );
        assert_eq!(
            "resize 120 40".parse::<BrowseCommand>().expect("parse"),
            BrowseCommand::Resize(120, 40)
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!("teleport".parse::<BrowseCommand>().is_err());
        assert!("gender robot".parse::<BrowseCommand>().is_err());
        assert!("star rick".parse::<BrowseCommand>().is_err());
        assert!("open".parse::<BrowseCommand>().is_err());
    }

    #[test]
    fn viewport_from_env_with_fallback() {
        let rect = terminal_viewport(|k| match k {
            "COLUMNS" => Some("132".to_string()),
            "LINES" => Some("nope".to_string()),
            _ => None,
        });
        assert_eq!(rect, Rect::new(0, 0, 132, DEFAULT_LINES));
        assert_eq!(terminal_viewport(|_| None), VIEWPORT);
    }

    #[test]
    fn edits_wait_for_apply() {
        let mut session = Session::new(UrlState::default(), VIEWPORT);
        session.edit(&BrowseCommand::Species(SpeciesFilter::Human));
        assert_eq!(session.applied().species, SpeciesFilter::All);
        assert!(session.panel_position().is_some());
        assert_eq!(session.url().to_query_string(), "");

        assert!(session.apply());
        assert_eq!(session.applied().species, SpeciesFilter::Human);
        assert!(session.panel_position().is_none());
        assert_eq!(session.url().to_query_string(), "?species=human");
    }

    #[test]
    fn cancel_discards_draft() {
        let mut session = Session::new(UrlState::default(), VIEWPORT);
        session.edit(&BrowseCommand::Sort(SortOrder::Desc));
        session.cancel();
        assert!(!session.apply());
        assert_eq!(session.applied().sort, SortOrder::Asc);
    }

    #[test]
    fn search_applies_without_touching_draft_facets() {
        let mut session = Session::new(UrlState::default(), VIEWPORT);
        session.edit(&BrowseCommand::Gender(GenderFilter::Female));
        assert!(session.apply_search(" Sum "));
        assert_eq!(session.applied().search, "Sum");
        assert_eq!(session.applied().gender, GenderFilter::All);
        assert!(!session.apply_search("Sum"));

        assert!(session.apply());
        assert_eq!(session.applied().gender, GenderFilter::Female);
        assert_eq!(session.applied().search, "Sum");
    }

    #[test]
    fn panel_anchors_below_trigger_and_follows_resize() {
        let mut session = Session::new(UrlState::default(), VIEWPORT);
        session.toggle_panel();
        let width = render::block_size(&session.panel_lines()).width;
        // End-aligned under a trigger spanning columns 70..79, one row gap.
        assert_eq!(session.panel_position(), Some(Point { x: 79 - width, y: 2 }));

        let moved = session.resize(Rect::new(0, 0, 120, 40));
        assert_eq!(moved, Some(Point { x: 119 - width, y: 2 }));

        session.toggle_panel();
        assert!(session.panel_position().is_none());
    }

    fn single_rick() -> Catalog {
        let rick = charadex_core::Character::new(1, "Rick Sanchez", "Human");
        Catalog::new(
            crate::catalog::CharacterSource::Snapshot(crate::catalog::Snapshot::new(vec![rick])),
            1,
        )
    }

    #[tokio::test]
    async fn star_toggles_through_catalog() {
        let catalog = single_rick();
        let mut favorites = FavoritesStore::new();
        assert!(toggle_star(&catalog, &mut favorites, CharacterId(1)).await.expect("star"));
        assert!(!toggle_star(&catalog, &mut favorites, CharacterId(1)).await.expect("unstar"));
        assert!(toggle_star(&catalog, &mut favorites, CharacterId(99)).await.is_err());
    }

    #[tokio::test]
    async fn failed_star_write_is_reported_not_fatal() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dir = temp.path().join("data");
        let backend = charadex_core::StorageBackend::open("file", dir.join("favorites.json"))
            .expect("open backend");
        let mut favorites = FavoritesStore::open(backend).expect("open store");

        // Replace the store directory with a plain file so every write fails.
        std::fs::remove_dir_all(&dir).ok();
        std::fs::write(&dir, b"").expect("block dir");

        let err = toggle_star(&single_rick(), &mut favorites, CharacterId(1))
            .await
            .expect_err("write should fail");
        assert!(matches!(err, AppError::Core(CharadexError::IoError(_))));
        assert!(!favorites.is_starred(CharacterId(1)));
    }

    #[test]
    fn url_restores_session() {
        let session = Session::new(UrlState::from_query("?relation=starred&sort=desc"), VIEWPORT);
        assert_eq!(session.applied().relation, RelationFilter::Starred);
        assert_eq!(session.applied().sort, SortOrder::Desc);
    }
}
