pub const TITLE: &str = "Bike Sharing Data Analysis";

pub const COLUMNS: &str = "\
Columns:
  - instant (Sample index)
  - dteday (Date)
  - season (Season):
      1: Spring
      2: Summer
      3: Fall
      4: Winter
  - yr (Year): 0 is 2011, 1 is 2012
  - mnth (Month) = 1 to 12
  - holiday = Whether the day is a holiday (http://dchr.dc.gov/page/holiday-schedule)
  - weekday = Day of the week
  - workingday = 1 if the day is neither weekend nor holiday, otherwise 0
  - weathersit:
      1: Clear, Few clouds, Partly cloudy
      2: Mist + Cloudy, Mist + Broken clouds, Mist + Few clouds, Mist
      3: Light Snow, Light Rain + Thunderstorm + Scattered clouds, Light Rain + Scattered clouds
  - temp = Normalized temperature in Celsius, divided by 41 (max)
  - atemp = Normalized feeling temperature in Celsius, divided by 50 (max)
  - hum = Normalized humidity, divided by 100 (max)
  - windspeed = Normalized wind speed, divided by 67 (max)
  - casual = Count of casual users
  - registered = Count of registered users
  - cnt = Count of total rental bikes including both casual and registered";

pub const QUESTIONS: &str = "\
Questions:
  1. When did the bike sharing rentals reach the highest number in a day?
  2. What is the bike sharing rental count for each month?
  3. How is the bike sharing rental distribution across different weather conditions?";

pub const HOURLY_CONCLUSION: &str = "\
Conclusion:
  1. Bike sharing use peaks at 17:00 and is lowest at 04:00, so usage varies \
strongly over the 24 hours of the day. The 17:00 peak lines up with the end of \
the working day, when people ride home; the 04:00 low reflects how few people \
are out at that hour. Knowing this pattern helps plan bicycle stock and customer \
service across the day.";

pub const MONTHLY_CONCLUSION: &str = "\
Conclusion:
  2. Combining the hour and day data, August has the highest number of rentals, \
reaching 702,388, likely helped by holidays and weather that suits cycling. \
January has the lowest, when winter weather discourages riding. Providers can \
target promotions at high months, plan stock around seasonal trends, and \
schedule maintenance and resources across the year.";

pub const WEATHER_CONCLUSION: &str = "\
Conclusion:
  3. Weather plays an important role in bike sharing use. Sunny days (1: Bright) \
show a clear spike in rentals, while foggy (2: Fog) and drizzly (3: Drizzle) days \
are quieter. People ride more when the weather is clear. Providers can run \
promotions on good-weather days and improve service reliability in bad weather \
to keep customers.";

pub const HELP: &str = "\
Commands:
  info | 1                   Data information
  analysis | 2 [choice]      Data analysis
      1 Bike Rental and Revenue per Month
      2 Bike Rental Distribution Per Season
      3 Bike Rental Distribution Per Weekday
      4 Frequency, Recency, and Monetary Analysis
  conclusion | 3 [choice]    Answers & conclusion
      1 Highest Rental in a Day
      2 Rental Count Per Month
      3 Rental Distribution Per Weather Condition
  help                       Show this help
  quit                       Leave the dashboard";
