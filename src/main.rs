fn main() {
    car_quiz_lib::run()
}
