//! Bundled reference data for the unit catalog.
//!
//! Factors are ratios to each category's base unit (first entry unless noted).
//! Currency and crypto entries carry factor 1: their real ratios come from the
//! rate cache at conversion time.

use crate::catalog::{Category, Strategy, UnitDefinition};
use crate::rates::RateKind;

type Row = (&'static str, &'static str, f64);

fn linear(key: &str, name: &str, icon: &str, rows: &[Row]) -> Category {
    let units = rows
        .iter()
        .map(|&(k, n, f)| UnitDefinition::new(k, n, f))
        .collect();
    Category::new(key, name, icon, Strategy::Linear, units)
}

fn rated(key: &str, name: &str, icon: &str, kind: RateKind, rows: &[(&str, &str)]) -> Category {
    let units = rows
        .iter()
        .map(|&(k, n)| UnitDefinition::new(k, n, 1.0))
        .collect();
    Category::new(key, name, icon, Strategy::Rate(kind), units)
}

pub(crate) fn builtin_categories() -> Vec<Category> {
    vec![
        linear("length", "Length", "📏", LENGTH),
        linear("weight", "Weight", "⚖️", WEIGHT),
        temperature(),
        linear("volume", "Volume", "🧊", VOLUME),
        linear("area", "Area", "📐", AREA),
        linear("speed", "Speed", "🏃", SPEED),
        linear("time", "Time", "⏰", TIME),
        linear(
            "digital_storage_binary",
            "Digital Storage (Binary)",
            "💾",
            DIGITAL_STORAGE_BINARY,
        ),
        linear(
            "digital_storage_decimal",
            "Digital Storage (Decimal)",
            "💿",
            DIGITAL_STORAGE_DECIMAL,
        ),
        linear("energy", "Energy", "⚡", ENERGY),
        linear("power", "Power", "🔋", POWER),
        linear("pressure", "Pressure", "🌪️", PRESSURE),
        linear("data_transfer", "Data Transfer", "📡", DATA_TRANSFER),
        linear("frequency", "Frequency", "📻", FREQUENCY),
        linear("cooking_volume", "Cooking Volume", "🍽️", COOKING_VOLUME),
        linear("cooking_weight", "Cooking Weight", "🥄", COOKING_WEIGHT),
        baking_temperature(),
        rated(
            "currency",
            "Currency (Real-time)",
            "💱",
            RateKind::Currency,
            CURRENCIES,
        ),
        rated(
            "crypto",
            "Cryptocurrency (Real-time)",
            "₿",
            RateKind::Crypto,
            CRYPTOCURRENCIES,
        ),
    ]
}

// Base: Celsius. celsius = (value + offset) * factor
fn temperature() -> Category {
    Category::new(
        "temperature",
        "Temperature",
        "🌡️",
        Strategy::Affine,
        vec![
            UnitDefinition::affine("celsius", "Celsius", 1.0, 0.0),
            UnitDefinition::affine("fahrenheit", "Fahrenheit", 5.0 / 9.0, -32.0),
            UnitDefinition::affine("kelvin", "Kelvin", 1.0, -273.15),
            UnitDefinition::affine("rankine", "Rankine", 5.0 / 9.0, -491.67),
        ],
    )
}

// Gas mark factors hold the mark's Fahrenheit temperature.
fn baking_temperature() -> Category {
    let mut units = vec![
        UnitDefinition::new("fahrenheit", "Fahrenheit", 1.0),
        UnitDefinition::new("celsius", "Celsius", 1.0),
    ];
    units.extend((1..=9u32).map(|mark| {
        UnitDefinition::new(
            format!("gas_mark_{}", mark),
            format!("Gas Mark {}", mark),
            f64::from(250 + mark * 25),
        )
    }));
    Category::new(
        "baking_temperature",
        "Baking Temperature",
        "🔥",
        Strategy::Baking,
        units,
    )
}

// Base: meter
const LENGTH: &[Row] = &[
    ("meters", "Meter", 1.0),
    ("kilometers", "Kilometer", 1000.0),
    ("centimeters", "Centimeter", 0.01),
    ("millimeters", "Millimeter", 0.001),
    ("micrometers", "Micrometer", 0.000001),
    ("nanometers", "Nanometer", 1e-9),
    ("miles", "Mile", 1609.344),
    ("yards", "Yard", 0.9144),
    ("feet", "Foot", 0.3048),
    ("inches", "Inch", 0.0254),
    ("nautical_miles", "Nautical Mile", 1852.0),
    ("light_years", "Light Year", 9.461e15),
    ("astronomical_units", "Astronomical Unit", 1.496e11),
    ("parsecs", "Parsec", 3.086e16),
    ("angstroms", "Angstrom", 1e-10),
];

// Base: kilogram
const WEIGHT: &[Row] = &[
    ("kilograms", "Kilogram", 1.0),
    ("grams", "Gram", 0.001),
    ("milligrams", "Milligram", 0.000001),
    ("micrograms", "Microgram", 1e-9),
    ("pounds", "Pound", 0.45359237),
    ("ounces", "Ounce", 0.028349523125),
    ("tons", "Ton", 1000.0),
    ("metric_tons", "Metric Ton", 1000.0),
    ("stone", "Stone", 6.35029318),
    ("carats", "Carat", 0.0002),
    ("atomic_mass_units", "Atomic Mass Unit", 1.66053907e-27),
];

// Base: liter
const VOLUME: &[Row] = &[
    ("liters", "Liter", 1.0),
    ("milliliters", "Milliliter", 0.001),
    ("cubic_meters", "Cubic Meter", 1000.0),
    ("gallons", "Gallon", 3.78541),
    ("quarts", "Quart", 0.946353),
    ("pints", "Pint", 0.473176),
    ("cups", "Cup", 0.236588),
    ("cubic_feet", "Cubic Foot", 28.3168),
    ("cubic_yards", "Cubic Yard", 764.555),
];

const AREA: &[Row] = &[
    ("square_meters", "Square Meter", 1.0),
    ("square_kilometers", "Square Kilometer", 1000000.0),
    ("square_feet", "Square Foot", 0.092903),
    ("square_yards", "Square Yard", 0.836127),
    ("acres", "Acre", 4046.86),
    ("hectares", "Hectare", 10000.0),
    ("square_miles", "Square Mile", 2589988.0),
];

const SPEED: &[Row] = &[
    ("meters_per_second", "Meter/Second", 1.0),
    ("kilometers_per_hour", "Kilometer/Hour", 0.277778),
    ("miles_per_hour", "Mile/Hour", 0.44704),
    ("knots", "Knot", 0.514444),
    ("feet_per_second", "Foot/Second", 0.3048),
    ("mach", "Mach", 340.29),
];

const TIME: &[Row] = &[
    ("seconds", "Second", 1.0),
    ("minutes", "Minute", 60.0),
    ("hours", "Hour", 3600.0),
    ("days", "Day", 86400.0),
    ("weeks", "Week", 604800.0),
    ("years", "Year", 31536000.0),
    ("decades", "Decade", 315360000.0),
    ("centuries", "Century", 3153600000.0),
];

const DIGITAL_STORAGE_BINARY: &[Row] = &[
    ("bytes", "Byte", 1.0),
    ("kibibytes", "Kibibyte", 1024.0),
    ("mebibytes", "Mebibyte", 1048576.0),
    ("gibibytes", "Gibibyte", 1073741824.0),
    ("tebibytes", "Tebibyte", 1099511627776.0),
    ("pebibytes", "Pebibyte", 1125899906842624.0),
];

const DIGITAL_STORAGE_DECIMAL: &[Row] = &[
    ("bytes", "Byte", 1.0),
    ("kilobytes", "Kilobyte", 1e3),
    ("megabytes", "Megabyte", 1e6),
    ("gigabytes", "Gigabyte", 1e9),
    ("terabytes", "Terabyte", 1e12),
    ("petabytes", "Petabyte", 1e15),
];

const ENERGY: &[Row] = &[
    ("joules", "Joule", 1.0),
    ("kilojoules", "Kilojoule", 1000.0),
    ("calories", "Calorie", 4.184),
    ("kilocalories", "Kilocalorie", 4184.0),
    ("watt_hours", "Watt Hour", 3600.0),
    ("kilowatt_hours", "Kilowatt Hour", 3600000.0),
    ("electron_volts", "Electron Volt", 1.602e-19),
];

const POWER: &[Row] = &[
    ("watts", "Watt", 1.0),
    ("kilowatts", "Kilowatt", 1000.0),
    ("megawatts", "Megawatt", 1000000.0),
    ("horsepower", "Horsepower", 745.7),
    ("btu_per_hour", "BTU/Hour", 0.293),
];

const PRESSURE: &[Row] = &[
    ("pascals", "Pascal", 1.0),
    ("kilopascals", "Kilopascal", 1000.0),
    ("megapascals", "Megapascal", 1000000.0),
    ("bars", "Bar", 100000.0),
    ("atmospheres", "Atmosphere", 101325.0),
    ("psi", "PSI", 6894.76),
    ("torr", "Torr", 133.322),
];

// Base: bit per second
const DATA_TRANSFER: &[Row] = &[
    ("bits_per_second", "Bit/Second", 1.0),
    ("kilobits_per_second", "Kilobit/Second", 1e3),
    ("megabits_per_second", "Megabit/Second", 1e6),
    ("gigabits_per_second", "Gigabit/Second", 1e9),
    ("bytes_per_second", "Byte/Second", 8.0),
    ("kilobytes_per_second", "Kilobyte/Second", 8e3),
    ("megabytes_per_second", "Megabyte/Second", 8e6),
];

const FREQUENCY: &[Row] = &[
    ("hertz", "Hertz", 1.0),
    ("kilohertz", "Kilohertz", 1e3),
    ("megahertz", "Megahertz", 1e6),
    ("gigahertz", "Gigahertz", 1e9),
    ("terahertz", "Terahertz", 1e12),
];

// Base: US cup; every factor is cups per unit
const COOKING_VOLUME: &[Row] = &[
    ("cups", "Cup", 1.0),
    ("tablespoons", "Tablespoon", 0.0625),
    ("teaspoons", "Teaspoon", 0.0208333),
    ("fluid_ounces", "Fluid Ounce", 0.125),
    ("pints", "Pint", 2.0),
    ("quarts", "Quart", 4.0),
    ("gallons", "Gallon", 16.0),
    ("milliliters", "Milliliter", 1.0 / 236.588),
    ("liters", "Liter", 1.0 / 0.236588),
    ("cubic_inches", "Cubic Inch", 1.0 / 14.4375),
    ("cubic_centimeters", "Cubic Centimeter", 1.0 / 236.588),
];

// Base: ounce; every factor is ounces per unit
const COOKING_WEIGHT: &[Row] = &[
    ("ounces", "Ounce", 1.0),
    ("pounds", "Pound", 16.0),
    ("grams", "Gram", 1.0 / 28.3495),
    ("kilograms", "Kilogram", 1000.0 / 28.3495),
    ("cups_flour", "Cup (Flour)", 4.25),
    ("cups_sugar", "Cup (Sugar)", 7.0),
    ("cups_butter", "Cup (Butter)", 8.0),
    ("tablespoons_butter", "Tablespoon (Butter)", 0.5),
    ("teaspoons_salt", "Teaspoon (Salt)", 5.69 / 28.3495),
];

const CURRENCIES: &[(&str, &str)] = &[
    ("USD", "US Dollar"),
    ("EUR", "Euro"),
    ("GBP", "British Pound"),
    ("JPY", "Japanese Yen"),
    ("CNY", "Chinese Yuan"),
    ("INR", "Indian Rupee"),
    ("AUD", "Australian Dollar"),
    ("CAD", "Canadian Dollar"),
    ("CHF", "Swiss Franc"),
    ("SEK", "Swedish Krona"),
    ("NOK", "Norwegian Krone"),
    ("DKK", "Danish Krone"),
    ("PLN", "Polish Zloty"),
    ("CZK", "Czech Koruna"),
    ("HUF", "Hungarian Forint"),
    ("RUB", "Russian Ruble"),
    ("BRL", "Brazilian Real"),
    ("MXN", "Mexican Peso"),
    ("ZAR", "South African Rand"),
    ("KRW", "South Korean Won"),
    ("SGD", "Singapore Dollar"),
    ("HKD", "Hong Kong Dollar"),
    ("NZD", "New Zealand Dollar"),
    ("TRY", "Turkish Lira"),
    ("AED", "UAE Dirham"),
    ("SAR", "Saudi Riyal"),
    ("QAR", "Qatari Riyal"),
    ("KWD", "Kuwaiti Dinar"),
    ("BHD", "Bahraini Dinar"),
    ("OMR", "Omani Rial"),
    ("JOD", "Jordanian Dinar"),
    ("LBP", "Lebanese Pound"),
    ("EGP", "Egyptian Pound"),
    ("MAD", "Moroccan Dirham"),
    ("TND", "Tunisian Dinar"),
    ("DZD", "Algerian Dinar"),
    ("LYD", "Libyan Dinar"),
    ("SDG", "Sudanese Pound"),
    ("ETB", "Ethiopian Birr"),
    ("KES", "Kenyan Shilling"),
    ("UGX", "Ugandan Shilling"),
    ("TZS", "Tanzanian Shilling"),
    ("RWF", "Rwandan Franc"),
    ("BIF", "Burundian Franc"),
    ("DJF", "Djiboutian Franc"),
    ("SOS", "Somali Shilling"),
    ("ERN", "Eritrean Nakfa"),
    ("SLL", "Sierra Leonean Leone"),
    ("GMD", "Gambian Dalasi"),
    ("GNF", "Guinean Franc"),
    ("LRD", "Liberian Dollar"),
    ("CDF", "Congolese Franc"),
    ("AOA", "Angolan Kwanza"),
    ("ZMW", "Zambian Kwacha"),
    ("BWP", "Botswana Pula"),
    ("SZL", "Swazi Lilangeni"),
    ("LSL", "Lesotho Loti"),
    ("NAD", "Namibian Dollar"),
    ("MZN", "Mozambican Metical"),
    ("MGA", "Malagasy Ariary"),
    ("MUR", "Mauritian Rupee"),
    ("SCR", "Seychellois Rupee"),
    ("KMF", "Comorian Franc"),
    ("MVR", "Maldivian Rufiyaa"),
    ("LKR", "Sri Lankan Rupee"),
    ("BDT", "Bangladeshi Taka"),
    ("NPR", "Nepalese Rupee"),
    ("BTN", "Bhutanese Ngultrum"),
    ("PKR", "Pakistani Rupee"),
    ("AFN", "Afghan Afghani"),
    ("TJS", "Tajikistani Somoni"),
    ("TMT", "Turkmenistani Manat"),
    ("UZS", "Uzbekistani Som"),
    ("KGS", "Kyrgyzstani Som"),
    ("KZT", "Kazakhstani Tenge"),
    ("MNT", "Mongolian Tugrik"),
    ("AMD", "Armenian Dram"),
    ("AZN", "Azerbaijani Manat"),
    ("GEL", "Georgian Lari"),
    ("MDL", "Moldovan Leu"),
    ("UAH", "Ukrainian Hryvnia"),
    ("BYN", "Belarusian Ruble"),
    ("BGN", "Bulgarian Lev"),
    ("RON", "Romanian Leu"),
    ("HRK", "Croatian Kuna"),
    ("RSD", "Serbian Dinar"),
    ("BAM", "Bosnia-Herzegovina Convertible Mark"),
    ("MKD", "Macedonian Denar"),
    ("ALL", "Albanian Lek"),
    ("ISK", "Icelandic Krona"),
    ("ILS", "Israeli New Shekel"),
    ("SYP", "Syrian Pound"),
    ("IQD", "Iraqi Dinar"),
    ("IRR", "Iranian Rial"),
    ("MMK", "Myanmar Kyat"),
    ("THB", "Thai Baht"),
    ("LAK", "Lao Kip"),
    ("KHR", "Cambodian Riel"),
    ("VND", "Vietnamese Dong"),
    ("IDR", "Indonesian Rupiah"),
    ("MYR", "Malaysian Ringgit"),
    ("PHP", "Philippine Peso"),
    ("TWD", "Taiwan New Dollar"),
    ("MOP", "Macanese Pataca"),
    ("BND", "Brunei Dollar"),
    ("MRO", "Mauritanian Ouguiya"),
    ("XOF", "West African CFA Franc"),
    ("XAF", "Central African CFA Franc"),
];

const CRYPTOCURRENCIES: &[(&str, &str)] = &[
    ("BTC", "Bitcoin"),
    ("ETH", "Ethereum"),
    ("BNB", "Binance Coin"),
    ("ADA", "Cardano"),
    ("SOL", "Solana"),
    ("XRP", "Ripple"),
    ("DOT", "Polkadot"),
    ("DOGE", "Dogecoin"),
    ("AVAX", "Avalanche"),
    ("SHIB", "Shiba Inu"),
    ("MATIC", "Polygon"),
    ("LTC", "Litecoin"),
    ("UNI", "Uniswap"),
    ("LINK", "Chainlink"),
    ("ATOM", "Cosmos"),
    ("FTM", "Fantom"),
    ("NEAR", "NEAR Protocol"),
    ("ALGO", "Algorand"),
    ("VET", "VeChain"),
    ("ICP", "Internet Computer"),
    ("FIL", "Filecoin"),
    ("TRX", "TRON"),
    ("ETC", "Ethereum Classic"),
    ("XLM", "Stellar"),
    ("MANA", "Decentraland"),
    ("SAND", "The Sandbox"),
    ("AXS", "Axie Infinity"),
    ("CHZ", "Chiliz"),
    ("ENJ", "Enjin Coin"),
    ("GALA", "Gala"),
];
