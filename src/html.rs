use maud::{DOCTYPE, Markup, html};

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500 \
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_SECONDARY_STYLE: &str = "py-2.5 px-5 \
    text-sm font-medium text-gray-900 bg-white rounded border border-gray-200 \
    hover:bg-gray-100 hover:text-blue-700 focus:z-10 dark:bg-gray-800 \
    dark:text-gray-400 dark:border-gray-600 dark:hover:text-white \
    dark:hover:bg-gray-700";

pub const BUTTON_LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline bg-transparent \
    border-none cursor-pointer";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "w-full max-w-md mt-6 p-6 space-y-4 \
    bg-white rounded-lg shadow dark:border dark:bg-gray-800 dark:border-gray-700";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_STYLE: &str = "w-full text-sm text-left rtl:text-right \
    text-gray-500 dark:text-gray-400";

pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - MoneyPenny" }
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
            }

            body class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900"
            {
                (content)
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Back to Homepage"
                    }
                }
            }
        }
    );

    base(title, &content)
}

/// Format `number` as dollars with two decimal places, e.g. "$12.50".
///
/// The sign follows the dollar sign ("$-3.00") and there are no thousands
/// separators. Magnitudes of 1e21 and above are written in exponent form
/// ("$1e+21").
pub fn format_currency(number: f64) -> String {
    if !number.is_finite() {
        let text = if number.is_nan() {
            "NaN"
        } else if number > 0.0 {
            "Infinity"
        } else {
            "-Infinity"
        };
        return format!("${text}");
    }

    if number.abs() >= 1e21 {
        let exponent_form = format!("{number:e}");
        return match exponent_form.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("${mantissa}e+{exponent}")
            }
            _ => format!("${exponent_form}"),
        };
    }

    // Negative zero is written without a sign.
    let number = if number == 0.0 { 0.0 } else { number };

    format!("${number:.2}")
}

#[cfg(test)]
mod format_currency_tests {
    use super::format_currency;

    #[test]
    fn pads_to_two_decimal_places() {
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(12.0), "$12.00");
        assert_eq!(format_currency(0.25), "$0.25");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn formats_negative_amounts_with_sign_after_dollar() {
        assert_eq!(format_currency(-3.0), "$-3.00");
        assert_eq!(format_currency(-45.6), "$-45.60");
    }

    #[test]
    fn rounds_sub_cent_amounts() {
        assert_eq!(format_currency(0.005), "$0.01");
        assert_eq!(format_currency(0.004), "$0.00");
        assert_eq!(format_currency(-0.001), "$-0.00");
        assert_eq!(format_currency(-0.0), "$0.00");
    }

    #[test]
    fn has_no_thousands_separators() {
        assert_eq!(format_currency(1234.5), "$1234.50");
        assert_eq!(format_currency(-1_000_000.0), "$-1000000.00");
    }

    #[test]
    fn large_amounts_use_fixed_notation_below_1e21() {
        assert_eq!(format_currency(1e20), "$100000000000000000000.00");
    }

    #[test]
    fn very_large_amounts_use_exponent_form() {
        assert_eq!(format_currency(1e21), "$1e+21");
        assert_eq!(format_currency(-1.5e22), "$-1.5e+22");
    }

    #[test]
    fn formats_non_finite_amounts() {
        assert_eq!(format_currency(f64::NAN), "$NaN");
        assert_eq!(format_currency(f64::INFINITY), "$Infinity");
        assert_eq!(format_currency(f64::NEG_INFINITY), "$-Infinity");
    }
}
