fn main() {
    horde_combat::game::run();
}
