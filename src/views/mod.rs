pub mod app_template;
