pub mod sim_vis2d;
pub mod sim_vis3d;
