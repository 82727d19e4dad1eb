//! An occasional cheerful message for whoever is running the scripts

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

/// chance of a greeting for users without their own odds
pub const DEFAULT_ODDS: f64 = 0.1;

/// `{name}` is replaced with the user's display name
const MESSAGES: [&str; 10] = [
    "Haaii! (*^3^)/☆ Go make some molecules happy today, {name}! (^ヮ^)/",
    "(≧ω≦) I believe in you, {name}! Your SCF will converge~ ☆",
    "Ohayou~ (づ｡◕‿‿◕｡)づ Rise and shine, the queue is waiting!",
    "Kawaii alert! ✨(⺣◡⺣)♡* Every geometry looks better when {name} optimizes it!",
    "(^-^)/ Yay! {name} is a wavefunction wizard! (^ω^＼)",
    "No imaginary frequencies in your heart today (｡♥‿♥｡)",
    "(★ω★)/ Senpai noticed your jobs! Keep shining~ ☆*:.｡.o(≧▽≦)o.｡.:*☆",
    "Hey hey~ (灬º‿º灬)♡ Let's get those energies together!",
    "(^-^)/♪♬ {name}, you're the ground state of this lab~ ♬♪(◕‿◕✿)",
    "Boop! (・ω・)ノ Stay cute and stay converged, {name}!",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    /// the value of `$USER`
    pub login: String,
    /// what to call them. defaults to the login
    pub name: Option<String>,
    /// chance of a greeting, overriding [GreetConfig::odds]
    pub odds: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GreetConfig {
    pub odds: f64,
    pub messages: Vec<String>,
    pub users: Vec<User>,
}

impl Default for GreetConfig {
    fn default() -> Self {
        Self {
            odds: DEFAULT_ODDS,
            messages: MESSAGES.map(String::from).to_vec(),
            users: Vec::new(),
        }
    }
}

impl GreetConfig {
    /// the display name and odds for `login`
    pub fn lookup<'a>(&'a self, login: &'a str) -> (&'a str, f64) {
        let user = self.users.iter().find(|u| u.login == login);
        let name = user.and_then(|u| u.name.as_deref()).unwrap_or(login);
        let odds = user.and_then(|u| u.odds).unwrap_or(self.odds);
        (name, odds)
    }
}

/// roll `rng` and maybe return a greeting for `login`
pub fn greeting<R: Rng + ?Sized>(
    rng: &mut R,
    login: &str,
    cfg: &GreetConfig,
) -> Option<String> {
    let (name, odds) = cfg.lookup(login);
    let roll: f64 = rng.gen_range(0.0..1.0);
    log::debug!("greeting roll {roll:.3} against odds {odds}");
    if roll >= odds {
        return None;
    }
    let msg = cfg.messages.choose(rng)?;
    Some(msg.replace("{name}", name))
}
