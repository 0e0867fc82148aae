use crate::models::NutritionFacts;

/// Score a product's nutrition on a 0..=10 scale: protein and fiber raise the
/// score, sugar, sodium and fat lower it. Products without nutrition data get
/// a neutral 5.
pub fn health_score(nutrition: Option<&NutritionFacts>) -> i16 {
    let Some(n) = nutrition else {
        return 5;
    };

    let mut score: i16 = 5;

    if n.protein_g >= 10.0 {
        score += 2;
    } else if n.protein_g >= 5.0 {
        score += 1;
    }

    if n.fiber_g >= 5.0 {
        score += 2;
    } else if n.fiber_g >= 2.5 {
        score += 1;
    }

    if n.sugar_g > 15.0 {
        score -= 2;
    } else if n.sugar_g > 7.5 {
        score -= 1;
    }

    if n.sodium_mg > 600.0 {
        score -= 2;
    } else if n.sodium_mg > 300.0 {
        score -= 1;
    }

    if n.fat_g > 17.0 {
        score -= 2;
    } else if n.fat_g > 10.0 {
        score -= 1;
    }

    score.clamp(0, 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts() -> NutritionFacts {
        NutritionFacts {
            calories: 200.0,
            protein_g: 0.0,
            carbs_g: 20.0,
            fat_g: 0.0,
            fiber_g: 0.0,
            sugar_g: 0.0,
            sodium_mg: 0.0,
        }
    }

    #[test]
    fn missing_nutrition_is_neutral() {
        assert_eq!(health_score(None), 5);
    }

    #[test]
    fn protein_and_fiber_raise_the_score() {
        let mut n = facts();
        n.protein_g = 12.0;
        n.fiber_g = 6.0;
        assert_eq!(health_score(Some(&n)), 9);
    }

    #[test]
    fn sugary_salty_fatty_product_bottoms_out() {
        let mut n = facts();
        n.sugar_g = 30.0;
        n.sodium_mg = 900.0;
        n.fat_g = 25.0;
        assert_eq!(health_score(Some(&n)), 0);
    }

    #[test]
    fn score_stays_within_bounds() {
        let mut n = facts();
        n.protein_g = 50.0;
        n.fiber_g = 20.0;
        assert_eq!(health_score(Some(&n)), 9);
        n.sugar_g = 100.0;
        n.sodium_mg = 2000.0;
        n.fat_g = 50.0;
        let score = health_score(Some(&n));
        assert!((0..=10).contains(&score));
    }
}
