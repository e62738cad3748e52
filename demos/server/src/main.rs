use std::{thread, time::Duration};

use log::error;

mod app;
use app::App;

const LOOP_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = match App::new() {
        Ok(app) => app,
        Err(error) => {
            error!("Cannot start server: {}", error);
            std::process::exit(1);
        }
    };

    loop {
        app.update();
        thread::sleep(LOOP_SLEEP);
    }
}
