fn main() {
    calibcam::run_cli();
}
