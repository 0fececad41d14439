use anyhow::{Context, Result};
use clap::Parser;
use maze_core::{
    ActorRef, CreatureId, Game, GameConfig, GameEvent, MoveOutcome, Orientation, Outcome, RoomId,
    actor::Actor,
    blueprint::Director,
    element::{MapElement, Obstacle},
    maze::{Maze, Room},
    presets,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze description (JSON). Uses the built-in four room maze when omitted.
    #[arg(short, long, value_name = "MAZE_FILE")]
    maze: Option<PathBuf>,

    /// Session settings (JSON).
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Seed for the creatures' walks.
    #[arg(long)]
    seed: Option<u64>,

    /// Name of the character.
    #[arg(short, long, default_value = "Hero")]
    name: String,

    /// Where the log goes; the terminal is busy with the UI.
    #[arg(long, value_name = "LOG_FILE", default_value = "maze.log")]
    log_file: PathBuf,
}

/// Lines kept in the message panel.
const MESSAGE_LINES: usize = 8;

struct App {
    /// The running session.
    game: Arc<Game>,
    /// Replies to the player's commands, newest last.
    messages: Vec<String>,
    bombs_armed: bool,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(game: Arc<Game>) -> Self {
        App {
            game,
            messages: Vec::new(),
            bombs_armed: false,
            should_quit: false,
        }
    }

    fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        if self.messages.len() > MESSAGE_LINES {
            self.messages.remove(0);
        }
    }

    fn walk(&mut self, orientation: Orientation) {
        let message = match self.game.move_character_towards(orientation) {
            Ok(MoveOutcome::Moved { to, .. }) => format!("You walk {orientation} into room {to}."),
            Ok(MoveOutcome::Blocked(Obstacle::Wall)) => "You bumped into a wall.".to_string(),
            Ok(MoveOutcome::Blocked(Obstacle::BombWall)) => {
                "You bumped into a bomb wall.".to_string()
            }
            Ok(MoveOutcome::Blocked(Obstacle::Bomb)) => "A bomb blocks the way.".to_string(),
            Ok(MoveOutcome::Blocked(Obstacle::ClosedDoor)) => "The door is closed.".to_string(),
            Ok(MoveOutcome::NoExit) => format!("There is nothing to the {orientation}."),
            Ok(MoveOutcome::Inactive) => "You can no longer move.".to_string(),
            Err(err) => err.to_string(),
        };
        self.say(message);
    }

    /// Handles one key press.
    fn command(&mut self, key: char) {
        if let Some(orientation) = Orientation::from_key(key) {
            self.walk(orientation);
            return;
        }
        match key {
            'x' => self.quit(),
            'k' | ' ' => match self.game.character_attack() {
                Ok(0) => self.say("You swing at nothing."),
                Ok(hit) => self.say(format!("You hit {hit} creature(s).")),
                Err(err) => self.say(err.to_string()),
            },
            'o' => {
                let doors = self.game.open_doors();
                self.say(format!("Opened {doors} door(s)."));
            }
            'c' => {
                let doors = self.game.close_doors();
                self.say(format!("Closed {doors} door(s)."));
            }
            'b' => {
                self.bombs_armed = !self.bombs_armed;
                let bombs = if self.bombs_armed {
                    self.game.arm_bombs()
                } else {
                    self.game.disarm_bombs()
                };
                let state = if self.bombs_armed { "Armed" } else { "Disarmed" };
                self.say(format!("{state} {bombs} bomb(s)."));
            }
            other => self.say(format!("Unrecognized command '{other}'.")),
        }
    }

    /// Sets the quit flag and retires the creatures so their threads wind down.
    fn quit(&mut self) {
        self.game.retire_all_creatures();
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    init_logging(&args)?;

    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            GameConfig::from_json(&text).context("Failed to parse config")?
        }
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    let game = match &args.maze {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read maze file {}", path.display()))?;
            Director::from_json(&text)?.build_session(config)?
        }
        None => presets::four_rooms()?.build_session(config)?,
    };
    let game = Arc::new(game);
    game.add_character(&args.name)?;
    game.open_doors();
    let launched = game.launch_all()?;
    info!(creatures = launched, "session started");

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    let mut app = App::new(Arc::clone(&game));
    app.say("w/a/s/d to move, k to attack, o/c doors, b bombs, x to quit.");

    // Run the main application loop, then restore the terminal either way
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result?;

    game.join_workers();
    Ok(())
}

/// Sends the log to a file so it does not draw over the UI.
fn init_logging(args: &Args) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("Failed to create log file {}", args.log_file.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("maze_core=info,maze_tui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
///
/// Creatures act on their own threads, so the screen is redrawn on a timer
/// as well as after every key.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let redraw_rate = Duration::from_millis(100);

    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(redraw_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char(c) => app.command(c),
                    KeyCode::Esc => app.quit(),
                    _ => app.say("Unrecognized command."),
                }
            }
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Rooms
            Constraint::Percentage(25), // Actors
            Constraint::Percentage(30), // Replies and journal
        ])
        .split(frame.area());

    render_rooms(frame, main_layout[0], &app.game);
    render_actors(frame, main_layout[1], &app.game);
    render_messages(frame, main_layout[2], app);
}

fn side_letter(orientation: Orientation) -> &'static str {
    match orientation {
        Orientation::North => "N:",
        Orientation::South => "S:",
        Orientation::East => "E:",
        Orientation::West => "W:",
    }
}

/// One glyph per side element.
fn element_span(maze: &Maze, element: Option<&MapElement>) -> Span<'static> {
    match element {
        None => Span::raw(" "),
        Some(MapElement::Wall) => Span::styled("#", Style::default().fg(Color::DarkGray)),
        Some(MapElement::BombWall { active: false }) => {
            Span::styled("%", Style::default().fg(Color::DarkGray))
        }
        Some(MapElement::BombWall { active: true }) => {
            Span::styled("%", Style::default().fg(Color::Red).bold())
        }
        Some(MapElement::Door(door)) if door.open => {
            Span::styled("+", Style::default().fg(Color::Green))
        }
        Some(MapElement::Door(_)) => Span::styled("|", Style::default().fg(Color::Yellow)),
        Some(MapElement::Bomb { active: true, .. }) => {
            Span::styled("*", Style::default().fg(Color::Red).bold())
        }
        // A disarmed bomb shows what it wraps, tinted.
        Some(MapElement::Bomb { inner, .. }) => {
            let inner = element_span(maze, maze.element(*inner));
            Span::styled(inner.content, Style::default().fg(Color::Magenta))
        }
    }
}

/// Who stands where, taken before the maze is locked for drawing.
struct Occupants {
    hero: Option<(String, RoomId)>,
    creatures: Vec<(CreatureId, RoomId)>,
}

fn room_line(maze: &Maze, room: &Room, occupants: &Occupants) -> Line<'static> {
    let label = if room.is_closet() { "Closet" } else { "Room" };
    let mut spans = vec![Span::raw(format!("{label} {:>3}  ", room.id))];
    for orientation in Orientation::ALL {
        let element = orientation
            .slot(&room.sides)
            .and_then(|id| maze.element(id));
        spans.push(Span::raw(side_letter(orientation)));
        spans.push(element_span(maze, element));
        spans.push(Span::raw(" "));
    }
    if let Some((name, _)) = occupants.hero.as_ref().filter(|(_, at)| *at == room.id) {
        spans.push(Span::styled(
            format!(" @{name}"),
            Style::default().fg(Color::Cyan).bold(),
        ));
    }
    for &(id, _) in occupants.creatures.iter().filter(|(_, at)| *at == room.id) {
        spans.push(Span::styled(format!(" c{id}"), Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

/// Renders every room with its four sides and occupants.
fn render_rooms(frame: &mut Frame, area: Rect, game: &Game) {
    let occupants = Occupants {
        hero: game
            .character()
            .filter(|c| c.is_alive())
            .map(|c| (c.name.clone(), c.position())),
        creatures: game
            .creatures()
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| (c.id, c.position()))
            .collect(),
    };
    let lines: Vec<Line> = game.with_maze(|maze| {
        maze.rooms()
            .map(|room| room_line(maze, room, &occupants))
            .collect()
    });
    let rooms = Paragraph::new(lines).block(Block::default().title("Maze").borders(Borders::ALL));
    frame.render_widget(rooms, area);
}

/// Renders health and position of every actor.
fn render_actors(frame: &mut Frame, area: Rect, game: &Game) {
    let mut items: Vec<ListItem> = Vec::new();
    if let Some(hero) = game.character() {
        items.push(ListItem::from(Line::from(Span::styled(
            format!(
                "{}  room {}  health {}  power {}",
                hero.name,
                hero.position(),
                hero.health(),
                hero.power()
            ),
            Style::default().fg(Color::Cyan),
        ))));
    }
    for creature in game.creatures() {
        let style = if creature.is_alive() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        items.push(ListItem::from(Line::from(Span::styled(
            format!(
                "c{}  {}  room {}  health {}  power {}",
                creature.id,
                creature.mode(),
                creature.position(),
                creature.health(),
                creature.power()
            ),
            style,
        ))));
    }
    let actors = List::new(items).block(Block::default().borders(Borders::ALL).title("Actors"));
    frame.render_widget(actors, area);
}

fn describe(event: &GameEvent) -> String {
    let name = |who: &ActorRef| match who {
        ActorRef::Character => "the character".to_string(),
        ActorRef::Creature(id) => format!("creature c{id}"),
    };
    match event {
        GameEvent::Attack {
            attacker,
            target,
            damage,
            health_left,
        } => format!(
            "{} hits {} for {damage}, {health_left} health left",
            name(attacker),
            name(target)
        ),
        GameEvent::CreatureRetired(id) => format!("creature c{id} is dead"),
        GameEvent::CharacterDied => "the character is dead".to_string(),
        GameEvent::Victory(Outcome::CharacterWins) => "The character wins!".to_string(),
        GameEvent::Victory(Outcome::CreaturesWin) => "The creatures win!".to_string(),
    }
}

/// Renders the command replies next to the tail of the session journal.
fn render_messages(frame: &mut Frame, area: Rect, app: &App) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let replies: Vec<ListItem> = app
        .messages
        .iter()
        .map(|m| ListItem::new(m.as_str()))
        .collect();
    frame.render_widget(
        List::new(replies).block(Block::default().borders(Borders::ALL).title("You")),
        halves[0],
    );

    let events = app.game.events();
    let tail: Vec<ListItem> = events
        .iter()
        .rev()
        .take(MESSAGE_LINES)
        .rev()
        .map(|e| ListItem::new(describe(e)))
        .collect();
    let title = match app.game.outcome() {
        Some(Outcome::CharacterWins) => "Journal - you won, press x",
        Some(Outcome::CreaturesWin) => "Journal - you lost, press x",
        None => "Journal",
    };
    frame.render_widget(
        List::new(tail).block(Block::default().borders(Borders::ALL).title(title)),
        halves[1],
    );
}
