pub mod canvas_controller;
