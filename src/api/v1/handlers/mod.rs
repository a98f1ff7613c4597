pub mod gamers;
pub mod games;
pub mod health;
pub mod leaderboard;
pub mod profile;
