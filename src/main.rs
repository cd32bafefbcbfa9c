fn main() {
    allpac::run_cli();
}
