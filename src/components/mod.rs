pub mod app;
pub mod camera_controls;
pub mod legend_panel;
pub mod radius_editor;
pub mod search_bar;
pub mod sketch_view;
pub mod tool_panel;
