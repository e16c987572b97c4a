pub mod camera_panel;
pub mod icon_panel;
pub mod listing_card;
pub mod listing_panel;
pub mod map_canvas;
pub mod options_panel;
pub mod taxonomy_panel;
pub mod top_bar;
pub mod transfer_panel;
