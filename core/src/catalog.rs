use crate::units::BaseUnit;

/// Global product catalog seeded into a fresh database: (name, category, default unit).
pub const GLOBAL_PRODUCTS: &[(&str, &str, BaseUnit)] = &[
    ("Eggs", "Dairy", BaseUnit::Unit),
    ("Milk", "Dairy", BaseUnit::Ml),
    ("Butter", "Dairy", BaseUnit::G),
    ("Cheese", "Dairy", BaseUnit::G),
    ("Yogurt", "Dairy", BaseUnit::G),
    ("Cream", "Dairy", BaseUnit::Ml),
    ("Sour Cream", "Dairy", BaseUnit::G),
    ("Chicken Breast", "Meat & Poultry", BaseUnit::G),
    ("Chicken Thighs", "Meat & Poultry", BaseUnit::G),
    ("Ground Beef", "Meat & Poultry", BaseUnit::G),
    ("Beef Steak", "Meat & Poultry", BaseUnit::G),
    ("Pork Chops", "Meat & Poultry", BaseUnit::G),
    ("Bacon", "Meat & Poultry", BaseUnit::G),
    ("Sausages", "Meat & Poultry", BaseUnit::Unit),
    ("Ham", "Meat & Poultry", BaseUnit::G),
    ("Turkey", "Meat & Poultry", BaseUnit::G),
    ("Salmon", "Seafood", BaseUnit::G),
    ("Tuna", "Seafood", BaseUnit::G),
    ("Shrimp", "Seafood", BaseUnit::G),
    ("Cod", "Seafood", BaseUnit::G),
    ("Onion", "Vegetables", BaseUnit::Unit),
    ("Garlic", "Vegetables", BaseUnit::Unit),
    ("Tomatoes", "Vegetables", BaseUnit::Unit),
    ("Potatoes", "Vegetables", BaseUnit::G),
    ("Carrots", "Vegetables", BaseUnit::Unit),
    ("Broccoli", "Vegetables", BaseUnit::Unit),
    ("Spinach", "Vegetables", BaseUnit::G),
    ("Lettuce", "Vegetables", BaseUnit::Unit),
    ("Cucumber", "Vegetables", BaseUnit::Unit),
    ("Bell Pepper", "Vegetables", BaseUnit::Unit),
    ("Mushrooms", "Vegetables", BaseUnit::G),
    ("Celery", "Vegetables", BaseUnit::Unit),
    ("Zucchini", "Vegetables", BaseUnit::Unit),
    ("Green Beans", "Vegetables", BaseUnit::G),
    ("Corn", "Vegetables", BaseUnit::Unit),
    ("Peas", "Vegetables", BaseUnit::G),
    ("Cabbage", "Vegetables", BaseUnit::Unit),
    ("Cauliflower", "Vegetables", BaseUnit::Unit),
    ("Asparagus", "Vegetables", BaseUnit::G),
    ("Avocado", "Vegetables", BaseUnit::Unit),
    ("Apples", "Fruits", BaseUnit::Unit),
    ("Bananas", "Fruits", BaseUnit::Unit),
    ("Oranges", "Fruits", BaseUnit::Unit),
    ("Lemons", "Fruits", BaseUnit::Unit),
    ("Limes", "Fruits", BaseUnit::Unit),
    ("Strawberries", "Fruits", BaseUnit::G),
    ("Blueberries", "Fruits", BaseUnit::G),
    ("Grapes", "Fruits", BaseUnit::G),
    ("Flour", "Pantry", BaseUnit::G),
    ("Sugar", "Pantry", BaseUnit::G),
    ("Brown Sugar", "Pantry", BaseUnit::G),
    ("Salt", "Pantry", BaseUnit::G),
    ("Pepper", "Pantry", BaseUnit::G),
    ("Olive Oil", "Pantry", BaseUnit::Ml),
    ("Vegetable Oil", "Pantry", BaseUnit::Ml),
    ("Rice", "Pantry", BaseUnit::G),
    ("Pasta", "Pantry", BaseUnit::G),
    ("Bread", "Pantry", BaseUnit::Unit),
    ("Oats", "Pantry", BaseUnit::G),
    ("Honey", "Pantry", BaseUnit::Ml),
    ("Soy Sauce", "Pantry", BaseUnit::Ml),
    ("Vinegar", "Pantry", BaseUnit::Ml),
    ("Tomato Paste", "Pantry", BaseUnit::G),
    ("Canned Tomatoes", "Pantry", BaseUnit::Unit),
    ("Chicken Stock", "Pantry", BaseUnit::Ml),
    ("Beef Stock", "Pantry", BaseUnit::Ml),
    ("Coconut Milk", "Pantry", BaseUnit::Ml),
    ("Peanut Butter", "Pantry", BaseUnit::G),
    ("Baking Powder", "Pantry", BaseUnit::G),
    ("Baking Soda", "Pantry", BaseUnit::G),
    ("Vanilla Extract", "Pantry", BaseUnit::Ml),
    ("Basil", "Herbs & Spices", BaseUnit::G),
    ("Oregano", "Herbs & Spices", BaseUnit::G),
    ("Thyme", "Herbs & Spices", BaseUnit::G),
    ("Rosemary", "Herbs & Spices", BaseUnit::G),
    ("Parsley", "Herbs & Spices", BaseUnit::G),
    ("Cilantro", "Herbs & Spices", BaseUnit::G),
    ("Cinnamon", "Herbs & Spices", BaseUnit::G),
    ("Cumin", "Herbs & Spices", BaseUnit::G),
    ("Paprika", "Herbs & Spices", BaseUnit::G),
    ("Chili Powder", "Herbs & Spices", BaseUnit::G),
    ("Ginger", "Herbs & Spices", BaseUnit::G),
    ("Turmeric", "Herbs & Spices", BaseUnit::G),
    ("Coffee", "Beverages", BaseUnit::G),
    ("Tea", "Beverages", BaseUnit::Unit),
    ("Orange Juice", "Beverages", BaseUnit::Ml),
    ("Apple Juice", "Beverages", BaseUnit::Ml),
    ("Toilet Paper", "Household", BaseUnit::Unit),
    ("Paper Towels", "Household", BaseUnit::Unit),
    ("Dish Soap", "Household", BaseUnit::Unit),
    ("Laundry Detergent", "Household", BaseUnit::Unit),
    ("Hand Soap", "Household", BaseUnit::Unit),
    ("Sponges", "Household", BaseUnit::Unit),
    ("Trash Bags", "Household", BaseUnit::Unit),
    ("Aluminum Foil", "Household", BaseUnit::Unit),
    ("Plastic Wrap", "Household", BaseUnit::Unit),
    ("Ziplock Bags", "Household", BaseUnit::Unit),
    ("Shampoo", "Personal Care", BaseUnit::Unit),
    ("Conditioner", "Personal Care", BaseUnit::Unit),
    ("Toothpaste", "Personal Care", BaseUnit::Unit),
    ("Deodorant", "Personal Care", BaseUnit::Unit),
    ("Body Wash", "Personal Care", BaseUnit::Unit),
];
