//! A constant velocity car driving around a circular world, and speeds recovered from its track.

use bayes_histogram::kinematics::{derivative, Car};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Start in the corner of a 4 by 6 world, moving right
    let mut car = Car::new((0, 0), (0, 1), (4, 6))?;
    car.move_by(1);
    car.move_by(2);
    car.turn_left();
    car.move_by(1);
    println!("State {:?}", car.state());
    println!("Path {:?}", car.path());

    // The same motion in matrix form, without wrapping
    println!("Predicted {}", car.predict_state(1.0)?);

    let positions: Vec<f64> = car.path().iter().map(|&(_, x)| x as f64).collect();
    let times: Vec<f64> = (0..positions.len()).map(|t| t as f64).collect();
    println!("Speeds {:?}", derivative(&positions, &times)?);
    Ok(())
}
