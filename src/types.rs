/// Stable project identifier (oracle record handle).
/// Examples: `https://devpost.com/software/pantry-pal`, `desc-7f3a09c2b1d4e865`
pub type ProjectId = String;
/// Canonical project page URL, used for de-duplication.
/// Example: `https://devpost.com/software/pantry-pal`
pub type ProjectUrl = String;
/// Project description text (markdown). Identity of a project for sampling.
/// Example: `Pantry Pal tracks what is in your fridge and suggests recipes.`
pub type Description = String;
/// Prize name as listed on a submission.
/// Examples: `Overall 1st Place`, `Best Use of MongoDB Atlas`
pub type PrizeName = String;
