pub mod board_view;
pub mod html_board;
