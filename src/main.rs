fn main() {
    spacepeng::game::run();
}
