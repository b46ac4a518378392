fn main() {
    zeroth::cli()
}
