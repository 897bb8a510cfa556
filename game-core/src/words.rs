use anyhow::{Result, anyhow};
use rand::seq::SliceRandom;

use game_types::Difficulty;

/// Supplies distinct candidate prompts for a difficulty tier. Consulted only
/// at round start; implementations carry no game state.
pub trait WordCatalog: Send + Sync {
    fn draw(&self, count: usize, difficulty: Difficulty) -> Vec<String>;
}

// Common objects and animals
const EASY_PROMPTS: &str = "\
sun
moon
star
cloud
raindrop
house
car
airplane
train
boat
cat
dog
rabbit
bird
fish
apple
banana
watermelon
strawberry
grape
flower
tree
mountain
river
ocean
book
pencil
scissors
telephone
television
glasses
hat
shoes
watch
umbrella
cake
ice cream
hamburger
pizza
noodles";

// Takes some creativity
const MEDIUM_PROMPTS: &str = "\
doctor
police officer
chef
teacher
farmer
dancing
swimming
running
sleeping
singing
happy
sad
angry
surprised
scared
castle
bridge
lighthouse
windmill
tent
dinosaur
lion
elephant
penguin
giraffe
robot
rocket
submarine
helicopter
motorcycle
key
mirror
clock
candle
balloon
rainbow
lightning
snowman
beach
forest";

// Abstract concepts and busy scenes
const HARD_PROMPTS: &str = "\
freedom
peace
dream
hope
friendship
music
art
science
magic
adventure
wedding
party
picnic
camping
travel
earthquake
volcano
tornado
tsunami
aurora
alien
ghost
vampire
mummy
wizard
pyramid
waterfall
skyscraper
carnival
jungle
chess
fishing
rock climbing
skiing
surfing
inventor
explorer
astronaut
firefighter
magician";

pub struct BuiltinCatalog {
    easy: Vec<String>,
    medium: Vec<String>,
    hard: Vec<String>,
}

impl BuiltinCatalog {
    pub fn new() -> Result<Self> {
        Self::from_word_lists(EASY_PROMPTS, MEDIUM_PROMPTS, HARD_PROMPTS)
    }

    /// Build a catalog from newline-separated prompt lists. Blank lines and
    /// `#` comments are skipped.
    pub fn from_word_lists(easy: &str, medium: &str, hard: &str) -> Result<Self> {
        let parse = |list: &str| -> Vec<String> {
            list.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string)
                .collect()
        };

        let catalog = Self {
            easy: parse(easy),
            medium: parse(medium),
            hard: parse(hard),
        };

        if catalog.easy.is_empty() || catalog.medium.is_empty() || catalog.hard.is_empty() {
            return Err(anyhow!("a prompt list is empty"));
        }

        Ok(catalog)
    }

    fn pool(&self, difficulty: Difficulty) -> Vec<&String> {
        match difficulty {
            Difficulty::Easy => self.easy.iter().collect(),
            Difficulty::Medium => self.medium.iter().collect(),
            Difficulty::Hard => self.hard.iter().collect(),
            Difficulty::Mixed => self
                .easy
                .iter()
                .chain(self.medium.iter())
                .chain(self.hard.iter())
                .collect(),
        }
    }
}

impl WordCatalog for BuiltinCatalog {
    fn draw(&self, count: usize, difficulty: Difficulty) -> Vec<String> {
        let pool = self.pool(difficulty);
        let mut rng = rand::thread_rng();
        pool.choose_multiple(&mut rng, count)
            .map(|word| (*word).clone())
            .collect()
    }
}
