pub mod theme_select;
