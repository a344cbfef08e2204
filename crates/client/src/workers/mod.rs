// Workers: scripts, routes, filters and settings

mod filters;
mod routes;
mod scripts;

pub use scripts::ScriptDeploy;
