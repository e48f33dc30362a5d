pub mod jump_menu;
pub mod tree_view;
