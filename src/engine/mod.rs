// Engine modules: fixed-timestep loop and physics substrate

pub mod game_loop;
pub mod physics;
