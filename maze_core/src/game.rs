use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
    thread::{self, JoinHandle},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    ActorRef, CreatureId, RoomId,
    actor::{Actor, Character, Creature, Hit},
    config::GameConfig,
    element::{Entry, Obstacle},
    error::GameError,
    maze::Maze,
    mode::{Behavior, Mode},
    orientation::Orientation,
};

/// Represents the outcome of one move attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: RoomId, to: RoomId },
    Blocked(Obstacle),
    /// Nothing is linked on that side.
    NoExit,
    /// The actor is dead or the session is over.
    Inactive,
}

/// Which faction won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    CharacterWins,
    CreaturesWin,
}

/// Entries of the session journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Attack {
        attacker: ActorRef,
        target: ActorRef,
        damage: i32,
        health_left: i32,
    },
    CreatureRetired(CreatureId),
    CharacterDied,
    Victory(Outcome),
}

/// Everything the creature threads and the player share.
#[derive(Debug)]
struct World {
    maze: Maze,
    creatures: BTreeMap<CreatureId, Creature>,
    next_creature_id: CreatureId,
    character: Option<Character>,
    outcome: Option<Outcome>,
    journal: Vec<GameEvent>,
}

impl World {
    fn position_of(&self, who: ActorRef) -> Option<RoomId> {
        match who {
            ActorRef::Character => self
                .character
                .as_ref()
                .filter(|c| c.is_alive())
                .map(Actor::position),
            ActorRef::Creature(id) => self
                .creatures
                .get(&id)
                .filter(|c| c.is_alive())
                .map(Actor::position),
        }
    }

    fn set_position(&mut self, who: ActorRef, room: RoomId) {
        let vitals = match who {
            ActorRef::Character => self.character.as_mut().map(Actor::vitals_mut),
            ActorRef::Creature(id) => self.creatures.get_mut(&id).map(Actor::vitals_mut),
        };
        if let Some(vitals) = vitals {
            vitals.position = room;
        }
    }

    /// Tries to move `who` through the `orientation` side of its room.
    fn move_actor(&mut self, who: ActorRef, orientation: Orientation) -> MoveOutcome {
        let Some(from) = self.position_of(who) else {
            return MoveOutcome::Inactive;
        };
        let Some(element) = self.maze.exit(from, orientation) else {
            debug!(actor = ?who, room = from, %orientation, "nothing linked that way");
            return MoveOutcome::NoExit;
        };
        match self.maze.enter(element, from) {
            Entry::Blocked(obstacle) => {
                debug!(actor = ?who, room = from, %orientation, ?obstacle, "bumped into an obstacle");
                MoveOutcome::Blocked(obstacle)
            }
            Entry::Arrived(to) => {
                self.set_position(who, to);
                debug!(actor = ?who, from, to, %orientation, "moved");
                self.arrived(who, to);
                MoveOutcome::Moved { from, to }
            }
        }
    }

    /// Side effects of entering a room: the character strikes whoever it meets.
    fn arrived(&mut self, who: ActorRef, room: RoomId) {
        match who {
            ActorRef::Character => {
                self.character_strikes_room();
            }
            ActorRef::Creature(id) => {
                if self.position_of(ActorRef::Character) == Some(room) {
                    self.character_strikes(id);
                }
            }
        }
    }

    /// The character hits every living creature in its room. Returns how many were hit.
    fn character_strikes_room(&mut self) -> usize {
        let Some(room) = self.position_of(ActorRef::Character) else {
            return 0;
        };
        let targets: Vec<CreatureId> = self
            .creatures
            .values()
            .filter(|c| c.is_alive() && c.position() == room)
            .map(|c| c.id)
            .collect();
        targets
            .into_iter()
            .filter(|&id| self.character_strikes(id))
            .count()
    }

    fn character_strikes(&mut self, id: CreatureId) -> bool {
        let Some(hero) = self.character.as_ref().filter(|c| c.is_alive()) else {
            return false;
        };
        let Some(creature) = self.creatures.get_mut(&id).filter(|c| c.is_alive()) else {
            return false;
        };
        let (attacker, target) = (hero.who(), creature.who());
        let damage = hero.power();
        let hit = creature.attacked_by(hero);
        let health_left = creature.health();
        self.record_hit(attacker, target, damage, health_left, hit);
        true
    }

    fn creature_strikes(&mut self, id: CreatureId) -> bool {
        let Some(creature) = self.creatures.get(&id).filter(|c| c.is_alive()) else {
            return false;
        };
        let Some(hero) = self
            .character
            .as_mut()
            .filter(|c| c.is_alive() && c.position() == creature.position())
        else {
            return false;
        };
        let (attacker, target) = (creature.who(), hero.who());
        let damage = creature.power();
        let hit = hero.attacked_by(creature);
        let health_left = hero.health();
        self.record_hit(attacker, target, damage, health_left, hit);
        true
    }

    fn record_hit(
        &mut self,
        attacker: ActorRef,
        target: ActorRef,
        damage: i32,
        health_left: i32,
        hit: Hit,
    ) {
        info!(?attacker, ?target, damage, health = health_left, "attack");
        self.journal.push(GameEvent::Attack {
            attacker,
            target,
            damage,
            health_left,
        });
        if hit == Hit::Died {
            self.died(target);
        }
    }

    /// Reacts to the hit that killed `who`. Runs once per actor.
    fn died(&mut self, who: ActorRef) {
        match who {
            ActorRef::Creature(id) => self.creature_retired(id),
            ActorRef::Character => {
                if let Some(hero) = &self.character {
                    info!(
                        name = %hero.name,
                        health = hero.health(),
                        room = hero.position(),
                        "the character has died"
                    );
                }
                self.journal.push(GameEvent::CharacterDied);
                self.declare(Outcome::CreaturesWin);
                self.retire_all();
            }
        }
    }

    fn retire(&mut self, id: CreatureId) -> Result<bool, GameError> {
        let creature = self
            .creatures
            .get_mut(&id)
            .ok_or(GameError::UnknownCreature(id))?;
        if !creature.vitals_mut().kill() {
            return Ok(false);
        }
        self.creature_retired(id);
        Ok(true)
    }

    fn retire_all(&mut self) -> usize {
        let ids: Vec<CreatureId> = self.creatures.keys().copied().collect();
        ids.into_iter()
            .filter(|&id| matches!(self.retire(id), Ok(true)))
            .count()
    }

    fn creature_retired(&mut self, id: CreatureId) {
        info!(creature = id, "creature retired");
        self.journal.push(GameEvent::CreatureRetired(id));
        self.check_win();
    }

    fn check_win(&mut self) {
        let hero_alive = self.character.as_ref().is_some_and(Actor::is_alive);
        if hero_alive && self.creatures.values().all(|c| !c.is_alive()) {
            self.declare(Outcome::CharacterWins);
        }
    }

    fn declare(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        info!(?outcome, "game over");
        self.outcome = Some(outcome);
        self.journal.push(GameEvent::Victory(outcome));
    }
}

/// A game session: the maze, the creature roster, the character and the
/// threads running each creature.
///
/// All shared state sits behind one lock. Creature threads hold an
/// `Arc<Game>` and never keep the lock while they sleep.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    world: Mutex<World>,
    workers: Mutex<HashMap<CreatureId, JoinHandle<()>>>,
}

impl Game {
    /// Creates a session over `maze` with no actors yet.
    pub fn new(maze: Maze, config: GameConfig) -> Self {
        Game {
            config,
            world: Mutex::new(World {
                maze,
                creatures: BTreeMap::new(),
                next_creature_id: 0,
                character: None,
                outcome: None,
                journal: Vec::new(),
            }),
            workers: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Adds a creature standing in `room`.
    pub fn add_creature(&self, mode: Mode, room: RoomId) -> Result<CreatureId, GameError> {
        let mut world = self.world.lock();
        if !world.maze.contains(room) {
            return Err(GameError::UnknownRoom(room));
        }
        let id = world.next_creature_id;
        world.next_creature_id += 1;
        world
            .creatures
            .insert(id, Creature::new(id, mode, room, &self.config));
        debug!(creature = id, %mode, room, "creature added");
        Ok(id)
    }

    /// Drops a creature from the roster. Its thread, if any, exits on its next tick.
    ///
    /// Removing the last living creature hands the character the win.
    pub fn remove_creature(&self, id: CreatureId) -> Result<Creature, GameError> {
        let mut world = self.world.lock();
        let removed = world
            .creatures
            .remove(&id)
            .ok_or(GameError::UnknownCreature(id))?;
        debug!(creature = id, "creature removed");
        world.check_win();
        Ok(removed)
    }

    /// Creates the character and places it in room 1.
    pub fn add_character(&self, name: &str) -> Result<(), GameError> {
        let mut world = self.world.lock();
        if world.character.is_some() {
            warn!(name, "rejected a second character");
            return Err(GameError::CharacterExists);
        }
        if !world.maze.contains(Maze::ENTRANCE) {
            return Err(GameError::UnknownRoom(Maze::ENTRANCE));
        }
        world.character = Some(Character::new(name, Maze::ENTRANCE, &self.config));
        info!(name, room = Maze::ENTRANCE, "character joined");
        Ok(())
    }

    /// Moves the character one step towards `orientation`.
    pub fn move_character_towards(
        &self,
        orientation: Orientation,
    ) -> Result<MoveOutcome, GameError> {
        let mut world = self.world.lock();
        if world.character.is_none() {
            return Err(GameError::NoCharacter);
        }
        Ok(world.move_actor(ActorRef::Character, orientation))
    }

    /// The character strikes every creature sharing its room. Returns how many were hit.
    pub fn character_attack(&self) -> Result<usize, GameError> {
        let mut world = self.world.lock();
        if world.character.is_none() {
            return Err(GameError::NoCharacter);
        }
        Ok(world.character_strikes_room())
    }

    /// Walk step of a creature tick: picks a direction and tries it.
    pub fn walk_creature(&self, id: CreatureId) -> Result<MoveOutcome, GameError> {
        let mut world = self.world.lock();
        if world.outcome.is_some() {
            return Ok(MoveOutcome::Inactive);
        }
        let creature = world
            .creatures
            .get_mut(&id)
            .ok_or(GameError::UnknownCreature(id))?;
        if !creature.is_alive() {
            return Ok(MoveOutcome::Inactive);
        }
        let orientation = creature.pick_orientation();
        Ok(world.move_actor(ActorRef::Creature(id), orientation))
    }

    /// Attack step of a creature tick. Returns whether the character was hit.
    pub fn creature_attack(&self, id: CreatureId) -> Result<bool, GameError> {
        let mut world = self.world.lock();
        if !world.creatures.contains_key(&id) {
            return Err(GameError::UnknownCreature(id));
        }
        Ok(world.creature_strikes(id))
    }

    /// Opens every door. Returns the number of doors found.
    pub fn open_doors(&self) -> usize {
        self.world.lock().maze.open_doors()
    }

    /// Closes every door. Returns the number of doors found.
    pub fn close_doors(&self) -> usize {
        self.world.lock().maze.close_doors()
    }

    pub fn arm_bombs(&self) -> usize {
        self.world.lock().maze.set_bombs_armed(true)
    }

    pub fn disarm_bombs(&self) -> usize {
        self.world.lock().maze.set_bombs_armed(false)
    }

    /// Starts the thread running `id`'s behavior loop.
    ///
    /// Returns `Ok(false)` when the creature is dead or already running.
    pub fn launch_creature(self: &Arc<Self>, id: CreatureId) -> Result<bool, GameError> {
        let mode = {
            let world = self.world.lock();
            let creature = world
                .creatures
                .get(&id)
                .ok_or(GameError::UnknownCreature(id))?;
            if !creature.is_alive() {
                return Ok(false);
            }
            creature.mode()
        };

        let mut workers = self.workers.lock();
        if workers.get(&id).is_some_and(|handle| !handle.is_finished()) {
            return Ok(false);
        }
        let game = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("creature-{id}"))
            .spawn(move || {
                while mode.act(&game, id) {}
                debug!(creature = id, "creature loop finished");
            })
            .map_err(|source| GameError::Spawn { id, source })?;
        workers.insert(id, handle);
        info!(creature = id, %mode, "creature launched");
        Ok(true)
    }

    /// Launches every living creature. Returns how many threads were started.
    pub fn launch_all(self: &Arc<Self>) -> Result<usize, GameError> {
        let ids: Vec<CreatureId> = self.world.lock().creatures.keys().copied().collect();
        let mut launched = 0;
        for id in ids {
            if self.launch_creature(id)? {
                launched += 1;
            }
        }
        Ok(launched)
    }

    /// Forces a creature's health to zero.
    ///
    /// Returns `Ok(false)` if it was already dead.
    pub fn retire_creature(&self, id: CreatureId) -> Result<bool, GameError> {
        self.world.lock().retire(id)
    }

    /// Retires every creature. Threads notice on their next tick.
    pub fn retire_all_creatures(&self) -> usize {
        self.world.lock().retire_all()
    }

    /// Waits for every launched creature thread to exit.
    ///
    /// Only returns once each creature is dead, so callers usually retire
    /// the roster first.
    pub fn join_workers(&self) {
        let handles: Vec<(CreatureId, JoinHandle<()>)> = self.workers.lock().drain().collect();
        for (id, handle) in handles {
            if handle.join().is_err() {
                warn!(creature = id, "creature thread panicked");
            }
        }
    }

    /// Whether a thread for `id` is currently running.
    pub fn is_running(&self, id: CreatureId) -> bool {
        self.workers
            .lock()
            .get(&id)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// The room `who` stands in, or `None` if it is dead or unknown.
    pub fn room_of(&self, who: ActorRef) -> Option<RoomId> {
        self.world.lock().position_of(who)
    }

    pub fn is_creature_alive(&self, id: CreatureId) -> bool {
        self.world
            .lock()
            .creatures
            .get(&id)
            .is_some_and(Actor::is_alive)
    }

    pub fn living_creatures(&self) -> usize {
        self.world
            .lock()
            .creatures
            .values()
            .filter(|c| c.is_alive())
            .count()
    }

    pub fn creature(&self, id: CreatureId) -> Option<Creature> {
        self.world.lock().creatures.get(&id).cloned()
    }

    /// Snapshot of the roster, ordered by id.
    pub fn creatures(&self) -> Vec<Creature> {
        self.world.lock().creatures.values().cloned().collect()
    }

    pub fn character(&self) -> Option<Character> {
        self.world.lock().character.clone()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.world.lock().outcome
    }

    /// Copy of the journal so far.
    pub fn events(&self) -> Vec<GameEvent> {
        self.world.lock().journal.clone()
    }

    /// Runs `f` against the maze while holding the session lock.
    pub fn with_maze<R>(&self, f: impl FnOnce(&Maze) -> R) -> R {
        f(&self.world.lock().maze)
    }
}
